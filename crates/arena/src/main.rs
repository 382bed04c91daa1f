//! `llmchess`: play a game in the terminal against humans, random movers
//! or language models.

use std::io::Write;

use agent_play::{
    AcquisitionError, ArenaConfig, ControllerError, ControllerSettings, GameController,
    TurnOutcome,
};
use anyhow::{Context, Result};
use chess_core::{Color, Position};
use clap::Parser;
use game_session::{PgnHeader, SessionState, export_pgn};
use llm_arena::{Cli, Command, build_seat, command::HELP, render};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing::info;
use tracing_subscriber::EnvFilter;

type Input = Lines<BufReader<Stdin>>;

enum AgentTurn {
    Done(TurnOutcome),
    Interrupted,
    Quit,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => ArenaConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ArenaConfig::default(),
    };

    let game = GameController::new(ControllerSettings::from_config(&config));
    let white = build_seat(&cli.white, &config, cli.seed_for(Color::White))?;
    let black = build_seat(&cli.black, &config, cli.seed_for(Color::Black))?;
    let playing_as = cli.playing_as();
    match &cli.fen {
        Some(fen) => {
            let position = Position::from_fen(fen).context("parsing --fen")?;
            game.start_game_from(white, black, playing_as, position)
                .context("starting from --fen")?;
        }
        None => game.start_game(white, black, playing_as),
    }

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    play(&game, &cli, &mut input).await?;

    let session = game.snapshot();
    println!();
    println!("{}", render::board(session.position(), playing_as));
    if let Some(headline) = session.headline() {
        println!("{headline}");
    }
    println!("{}", render::status_line(&session));

    let header = PgnHeader {
        event: cli.event.clone(),
        ..PgnHeader::default()
    };
    let pgn = export_pgn(&session, &header);
    match &cli.pgn {
        Some(path) => {
            std::fs::write(path, &pgn).with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "pgn written");
        }
        None => println!("\n{pgn}"),
    }
    Ok(())
}

async fn play(game: &GameController, cli: &Cli, input: &mut Input) -> Result<()> {
    let mut stdin_open = true;
    let mut agent_plies = 0usize;
    show(game, cli.playing_as());

    loop {
        if matches!(
            game.with_session(|s| s.state()),
            SessionState::Finished | SessionState::Idle
        ) {
            return Ok(());
        }

        if game.is_agent_turn() {
            if cli.max_plies.is_some_and(|max| agent_plies >= max) {
                println!("agent move limit reached");
                return Ok(());
            }
            match agent_turn(game, cli.playing_as(), input, &mut stdin_open).await? {
                AgentTurn::Done(outcome) => {
                    agent_plies += 1;
                    println!("{}", render::outcome_line(&outcome));
                    show(game, cli.playing_as());
                }
                AgentTurn::Interrupted => show(game, cli.playing_as()),
                AgentTurn::Quit => return Ok(()),
            }
            continue;
        }

        if !stdin_open {
            println!("input closed");
            return Ok(());
        }
        print!("{}> ", game.with_session(|s| s.turn()));
        std::io::stdout().flush().context("flushing stdout")?;
        let Some(line) = input.next_line().await.context("reading stdin")? else {
            stdin_open = false;
            continue;
        };
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        if command == Command::Quit {
            return Ok(());
        }
        match human_command(game, cli.playing_as(), command) {
            Ok(()) => {}
            Err(e) => println!("{e}"),
        }
    }
}

/// Runs one agent turn in the background while still reading commands,
/// so the human can pause or resign without waiting for the model.
async fn agent_turn(
    game: &GameController,
    playing_as: Color,
    input: &mut Input,
    stdin_open: &mut bool,
) -> Result<AgentTurn> {
    let worker = game.clone();
    let mut task: JoinHandle<_> = tokio::spawn(async move { worker.play_agent_turn().await });
    let who = game.with_session(|s| s.players().display_name(s.turn()));
    println!("{who} is thinking...");

    loop {
        tokio::select! {
            joined = &mut task => {
                return match joined.context("agent task failed")? {
                    Ok(outcome) => Ok(AgentTurn::Done(outcome)),
                    Err(ControllerError::Acquisition(AcquisitionError::Cancelled)) => {
                        Ok(AgentTurn::Interrupted)
                    }
                    Err(e) => Err(e.into()),
                };
            }
            line = input.next_line(), if *stdin_open => {
                let Some(line) = line.context("reading stdin")? else {
                    *stdin_open = false;
                    continue;
                };
                match line.parse::<Command>() {
                    Ok(Command::Quit) => {
                        task.abort();
                        return Ok(AgentTurn::Quit);
                    }
                    Ok(command @ (Command::Pause | Command::Resign)) => {
                        let applied = human_command(game, playing_as, command);
                        task.abort();
                        if let Err(e) = applied {
                            println!("{e}");
                        }
                        return Ok(AgentTurn::Interrupted);
                    }
                    Ok(command) if command.is_read_only() => {
                        if let Err(e) = human_command(game, playing_as, command) {
                            println!("{e}");
                        }
                    }
                    Ok(_) => println!("an agent is thinking; try pause, resign, quit or board"),
                    Err(e) => println!("{e}"),
                }
            }
        }
    }
}

/// The human side a command speaks for: the side to move when a human
/// holds it, otherwise the perspective seat.
fn human_color(game: &GameController, playing_as: Color) -> Color {
    let turn = game.with_session(|s| s.turn());
    if game.has_agent(turn) { playing_as } else { turn }
}

fn human_command(game: &GameController, playing_as: Color, command: Command) -> Result<()> {
    let me = human_color(game, playing_as);
    match command {
        Command::Move(notation) => {
            let record = game.submit_human_move(&notation)?;
            println!("{} plays {}", record.color, record.san);
            show(game, playing_as);
        }
        Command::Resign => {
            let result = game.resign(me)?;
            println!("{result}");
        }
        Command::OfferDraw => {
            game.offer_draw(me, true)?;
            println!("{me} offers a draw");
        }
        Command::AcceptDraw => {
            let result = game.accept_draw(me)?;
            println!("{result}");
        }
        Command::DeclineDraw => {
            game.decline_draw()?;
            println!("draw offer declined");
        }
        Command::Pause => {
            game.pause()?;
            println!("paused; type 'resume' to continue");
        }
        Command::Resume => {
            game.resume()?;
            println!("resumed");
        }
        Command::Board => show(game, playing_as),
        Command::Moves => {
            let moves = game.with_session(|s| s.legal_sans());
            println!("{}", moves.join(" "));
        }
        Command::History(index) => {
            let pos = game.view_history(index)?;
            println!("{}", render::board(&pos, playing_as));
            println!("{}", game.with_session(render::status_line));
        }
        Command::Pgn => {
            let pgn = game.with_session(|s| export_pgn(s, &PgnHeader::default()));
            println!("{pgn}");
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
    Ok(())
}

fn show(game: &GameController, perspective: Color) {
    game.with_session(|s| {
        println!("{}", render::board(&s.displayed_position(), perspective));
        println!("{}", render::captured_line(s));
        println!("{}", render::status_line(s));
    });
}
