use super::csv::{parse_rows, write_row};
use super::errors::LeaderboardError;
use super::models::{LeaderboardRecord, LeaderboardTable, ProfileRow};

/// Column order of the serialized snapshot
pub const COLUMNS: [&str; 10] = [
    "name",
    "game_badges",
    "special_game_badges",
    "trivia_badges",
    "skill_badges",
    "lab_badges",
    "arcade_points",
    "milestone",
    "bonus_points",
    "total_points",
];

/// Orders rows by total points, highest first. Equal totals keep their input order.
pub fn assemble(rows: Vec<ProfileRow>) -> LeaderboardTable {
    let mut rows = rows;
    // sort_by_key is stable
    rows.sort_by_key(|row| std::cmp::Reverse(row.total_points()));
    LeaderboardTable::from_ordered(rows)
}

pub fn serialize(table: &LeaderboardTable) -> Vec<u8> {
    let mut out = String::new();
    write_row(&mut out, &COLUMNS);

    for record in table.records() {
        write_row(
            &mut out,
            &[
                record.name,
                record.game_badges.to_string(),
                record.special_game_badges.to_string(),
                record.trivia_badges.to_string(),
                record.skill_badges.to_string(),
                record.lab_badges.to_string(),
                record.arcade_points.to_string(),
                record.milestone,
                record.bonus_points.to_string(),
                record.total_points.to_string(),
            ],
        );
    }

    out.into_bytes()
}

/// Parses bytes produced by [`serialize`]. Row order is taken as-is.
pub fn deserialize(bytes: &[u8]) -> Result<LeaderboardTable, LeaderboardError> {
    let text = std::str::from_utf8(bytes).map_err(|_| LeaderboardError::Encoding)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut rows = parse_rows(text).into_iter();
    let header = rows
        .next()
        .ok_or_else(|| LeaderboardError::Header(String::new()))?;
    if header.len() != COLUMNS.len() || header.iter().zip(COLUMNS).any(|(a, b)| a != b) {
        return Err(LeaderboardError::Header(header.join(",")));
    }

    let rows = rows
        .enumerate()
        .map(|(index, fields)| parse_record(index + 1, fields).map(ProfileRow::from))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(LeaderboardTable::from_ordered(rows))
}

fn parse_record(row: usize, fields: Vec<String>) -> Result<LeaderboardRecord, LeaderboardError> {
    if fields.len() != COLUMNS.len() {
        return Err(LeaderboardError::FieldCount {
            row,
            expected: COLUMNS.len(),
            found: fields.len(),
        });
    }

    let number = |index: usize| -> Result<u32, LeaderboardError> {
        fields[index]
            .trim()
            .parse::<u32>()
            .map_err(|_| LeaderboardError::InvalidNumber {
                row,
                column: COLUMNS[index],
                value: fields[index].clone(),
            })
    };

    Ok(LeaderboardRecord {
        name: fields[0].clone(),
        game_badges: number(1)?,
        special_game_badges: number(2)?,
        trivia_badges: number(3)?,
        skill_badges: number(4)?,
        lab_badges: number(5)?,
        arcade_points: number(6)?,
        milestone: fields[7].clone(),
        bonus_points: number(8)?,
        total_points: number(9)?,
    })
}
