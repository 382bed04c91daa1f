use crate::{board::Position, movegen::legal_moves_into, types::Move};

/// Counts the leaf positions reachable from `pos` in exactly `depth` plies.
/// Used to check the move generator against published node counts.
pub fn perft(pos: &Position, depth: u8) -> u64 {
    fn inner(pos: &Position, depth: u8, layers: &mut [Vec<Move>]) -> u64 {
        let Some((buf, rest)) = layers.split_first_mut() else {
            return 1;
        };

        buf.clear();
        legal_moves_into(pos, buf);
        if depth == 1 {
            return buf.len() as u64;
        }

        buf.iter()
            .map(|&mv| inner(&pos.after(mv), depth - 1, rest))
            .sum()
    }

    if depth == 0 {
        return 1;
    }
    let mut layers = vec![Vec::with_capacity(64); depth as usize];
    inner(pos, depth, &mut layers[..])
}

/// Node counts split by root move, keyed by coordinate notation.
pub fn divide(pos: &Position, depth: u8) -> Vec<(String, u64)> {
    let mut roots = Vec::new();
    legal_moves_into(pos, &mut roots);
    roots
        .into_iter()
        .map(|mv| {
            let nodes = perft(&pos.after(mv), depth.saturating_sub(1));
            (crate::uci::move_to_uci(mv), nodes)
        })
        .collect()
}
