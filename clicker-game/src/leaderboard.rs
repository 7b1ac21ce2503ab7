//! Ranking players by progression power.
use serde::Serialize;
use std::cmp::Reverse;

use crate::record::PlayerRecord;

/// Composite ranking key, compared lexicographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Power {
    /// Highest slot with any level at all, not the unlock frontier.
    pub best_character: usize,
    pub best_character_level: u8,
    pub total_levels: u32,
    pub coins: u64,
}

impl Power {
    #[must_use]
    pub fn of(record: &PlayerRecord) -> Self {
        let best_character = record
            .character_levels
            .iter()
            .rposition(|level| *level > 0)
            .unwrap_or(0);
        Self {
            best_character,
            best_character_level: record.level_of(best_character),
            total_levels: record.total_levels(),
            coins: record.coins,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedEntry {
    /// 1-based.
    pub position: usize,
    pub id: String,
    pub power: Power,
    pub record: PlayerRecord,
}

/// Order every record by descending power.
///
/// The sort is stable: players with identical power keep the order in which
/// they were supplied.
#[must_use]
pub fn rank(records: Vec<(String, PlayerRecord)>) -> Vec<RankedEntry> {
    let mut keyed: Vec<(Power, String, PlayerRecord)> = records
        .into_iter()
        .map(|(id, record)| (Power::of(&record), id, record))
        .collect();
    keyed.sort_by_key(|(power, _, _)| Reverse(*power));
    keyed
        .into_iter()
        .enumerate()
        .map(|(idx, (power, id, record))| RankedEntry {
            position: idx + 1,
            id,
            power,
            record,
        })
        .collect()
}

/// 1-based position of `id` within a ranking.
#[must_use]
pub fn position_of(ranking: &[RankedEntry], id: &str) -> Option<usize> {
    ranking
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.position)
}

/// Top of the table plus where the viewer stands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardView {
    pub entries: Vec<RankedEntry>,
    pub total_players: usize,
    pub viewer_position: Option<usize>,
}

impl LeaderboardView {
    #[must_use]
    pub fn from_ranking(mut ranking: Vec<RankedEntry>, limit: usize, viewer: Option<&str>) -> Self {
        let total_players = ranking.len();
        let viewer_position = viewer.and_then(|id| position_of(&ranking, id));
        ranking.truncate(limit);
        Self {
            entries: ranking,
            total_players,
            viewer_position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::SmallVec;

    fn player(levels: &[u8], coins: u64) -> PlayerRecord {
        PlayerRecord {
            character_levels: SmallVec::from_slice(levels),
            coins,
            ..PlayerRecord::default()
        }
    }

    fn order(ranking: &[RankedEntry]) -> Vec<&str> {
        ranking.iter().map(|entry| entry.id.as_str()).collect()
    }

    #[test]
    fn power_uses_highest_nonzero_slot() {
        let power = Power::of(&player(&[10, 0, 3, 0], 7));
        assert_eq!(
            power,
            Power {
                best_character: 2,
                best_character_level: 3,
                total_levels: 13,
                coins: 7,
            }
        );
        assert_eq!(Power::of(&player(&[0, 0], 9)).best_character, 0);
    }

    #[test]
    fn components_break_ties_in_order() {
        let ranking = rank(vec![
            ("coins".into(), player(&[10, 2, 0], 900)),
            ("level".into(), player(&[10, 3, 0], 0)),
            ("slot".into(), player(&[10, 10, 1], 0)),
            ("total".into(), player(&[4, 2, 0], 100_000)),
            ("poor".into(), player(&[9, 0, 0], 50_000)),
        ]);
        assert_eq!(order(&ranking), vec!["slot", "level", "coins", "total", "poor"]);
        assert_eq!(ranking[0].position, 1);
        assert_eq!(position_of(&ranking, "poor"), Some(5));
        assert_eq!(position_of(&ranking, "ghost"), None);
    }

    #[test]
    fn equal_power_keeps_input_order() {
        let ranking = rank(vec![
            ("b".into(), player(&[1], 5)),
            ("a".into(), player(&[1], 5)),
            ("c".into(), player(&[1], 5)),
        ]);
        assert_eq!(order(&ranking), vec!["b", "a", "c"]);
    }

    #[test]
    fn view_truncates_but_keeps_viewer_position() {
        let ranking = rank(
            (0..15u8)
                .map(|n| (format!("p{n}"), player(&[n.min(10)], u64::from(n))))
                .collect(),
        );
        let view = LeaderboardView::from_ranking(ranking, 10, Some("p0"));
        assert_eq!(view.entries.len(), 10);
        assert_eq!(view.total_players, 15);
        assert_eq!(view.viewer_position, Some(15));
        assert_eq!(view.entries[0].id, "p14");
    }

    #[test]
    fn empty_input_ranks_nothing() {
        assert!(rank(Vec::new()).is_empty());
    }
}
