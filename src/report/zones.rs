use serde::Serialize;

use super::{
    average, games_by_week, in_last_games, last_n_games, rate, Conversions, LastGames,
    LAST_GAMES_WINDOW,
};
use crate::analytics::classify::{is_touchdown, RED_ZONE_YARDS, GREEN_ZONE_YARDS};
use crate::analytics::fourth_down::is_go_for_it;
use crate::models::{ClassifiedPlay, PlayClassification, SpecialTeamsKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    /// Inside the 20
    Red,
    /// Inside the 30
    Green,
}

impl Zone {
    pub fn max_yards_to_goal(self) -> u32 {
        match self {
            Zone::Red => RED_ZONE_YARDS,
            Zone::Green => GREEN_ZONE_YARDS,
        }
    }

    pub fn contains(self, play: &ClassifiedPlay) -> bool {
        match self {
            Zone::Red => play.in_red_zone,
            Zone::Green => play.in_green_zone,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ZoneTotals {
    pub total_plays: usize,
    pub touchdowns: usize,
    pub touchdown_rate: f64,
    pub turnovers: usize,
    /// Mean over plays that carry a PPA value
    pub avg_ppa: f64,
    pub explosive_plays: usize,
    pub explosive_rate: f64,
    pub third_down: Conversions,
    pub fourth_down: Conversions,
}

impl ZoneTotals {
    fn from_plays(plays: &[ClassifiedPlay]) -> Self {
        let touchdowns = plays.iter().filter(|p| is_offensive_touchdown(p)).count();
        let ppas: Vec<f64> = plays.iter().filter_map(|p| p.play.ppa).collect();
        let explosive_plays = plays.iter().filter(|p| p.explosive).count();
        ZoneTotals {
            total_plays: plays.len(),
            touchdowns,
            touchdown_rate: rate(touchdowns, plays.len()),
            turnovers: plays.iter().filter(|p| p.play.turnover).count(),
            avg_ppa: average(ppas.iter().sum(), ppas.len()),
            explosive_plays,
            explosive_rate: rate(explosive_plays, plays.len()),
            third_down: Conversions::count(plays.iter().filter(|p| p.play.down == 3)),
            fourth_down: Conversions::count(plays.iter().filter(|p| is_go_for_it(&p.play))),
        }
    }
}

/// Zone trips of one game
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneGame {
    pub game_id: String,
    pub week: Option<u32>,
    pub plays: usize,
    pub scores: usize,
    pub touchdowns: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneBreakdowns {
    pub by_game: Vec<ZoneGame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneAnalysis {
    pub zone: Zone,
    pub totals: ZoneTotals,
    pub last_3_games: LastGames<ZoneTotals>,
    pub breakdowns: ZoneBreakdowns,
    pub plays: Vec<ClassifiedPlay>,
}

/// Touchdown scored by the offense; a return score off the snap is not.
fn is_offensive_touchdown(play: &ClassifiedPlay) -> bool {
    play.play.scoring && !play.play.turnover && is_touchdown(&play.play)
}

/// Offensive plays count toward zone efficiency; field goal attempts do too
/// even though they are special teams.
fn is_zone_play(play: &ClassifiedPlay, team: &str) -> bool {
    play.play.is_offense(team)
        && (play.play_classification != PlayClassification::SpecialTeams
            || play.special_teams == Some(SpecialTeamsKind::FieldGoal))
}

pub fn analyze(plays: &[ClassifiedPlay], team: &str, zone: Zone) -> ZoneAnalysis {
    let in_zone: Vec<ClassifiedPlay> = plays
        .iter()
        .filter(|p| is_zone_play(p, team) && zone.contains(p))
        .cloned()
        .collect();

    let by_game = games_by_week(plays)
        .into_iter()
        .map(|g| {
            let game_plays = in_zone.iter().filter(|p| p.play.game_id == g.game_id);
            ZoneGame {
                plays: game_plays.clone().count(),
                scores: game_plays
                    .clone()
                    .filter(|p| p.play.scoring && !p.play.turnover)
                    .count(),
                touchdowns: game_plays.filter(|p| is_offensive_touchdown(p)).count(),
                game_id: g.game_id,
                week: g.week,
            }
        })
        .collect();

    let games = last_n_games(plays, LAST_GAMES_WINDOW);
    let recent = in_last_games(&in_zone, &games);

    ZoneAnalysis {
        zone,
        totals: ZoneTotals::from_plays(&in_zone),
        last_3_games: LastGames {
            games,
            stats: ZoneTotals::from_plays(&recent),
        },
        breakdowns: ZoneBreakdowns { by_game },
        plays: in_zone,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::classify::{classify, tests::play};
    use crate::models::Play;
    use approx::assert_relative_eq;

    fn at(game: &str, ytg: u32, play_type: &str, gained: i32, ppa: Option<f64>) -> ClassifiedPlay {
        classify(Play {
            game_id: game.into(),
            week: Some(game[1..].parse().unwrap()),
            yards_to_goal: Some(ytg),
            yard_line: Some(100 - ytg),
            play_type: play_type.into(),
            ppa,
            ..play(1, 10, gained)
        })
    }

    #[test]
    fn test_red_zone_totals() {
        let mut td = at("g1", 8, "Rushing Touchdown", 8, Some(3.2));
        td.play.scoring = true;
        let mut fg = at("g1", 15, "Field Goal Good", 0, None);
        fg.play.scoring = true;
        let mut fourth = at("g2", 2, "Rush", 2, Some(1.0));
        fourth.play.down = 4;
        fourth.play.distance = 1;
        let plays = vec![
            td,
            fg,
            fourth,
            at("g2", 25, "Rush", 4, Some(0.5)),
            at("g2", 18, "Punt", 40, None),
        ];

        let red = analyze(&plays, "Purdue", Zone::Red);
        assert_eq!(red.totals.total_plays, 3);
        assert_eq!(red.totals.touchdowns, 1);
        assert_relative_eq!(red.totals.touchdown_rate, 100.0 / 3.0, epsilon = 1e-9);
        // PPA averaged over the two plays that carry it
        assert_relative_eq!(red.totals.avg_ppa, 2.1, epsilon = 1e-12);
        assert_eq!(red.totals.fourth_down.attempts, 1);
        assert_eq!(red.totals.fourth_down.conversions, 1);
        assert_eq!(red.breakdowns.by_game[0].scores, 2);
        assert_eq!(red.breakdowns.by_game[0].touchdowns, 1);

        let green = analyze(&plays, "Purdue", Zone::Green);
        assert_eq!(green.totals.total_plays, 4);
        assert!(red.plays.len() <= green.plays.len());
    }

    #[test]
    fn test_return_touchdown_not_an_offensive_touchdown() {
        let mut td = at("g1", 6, "Passing Touchdown", 6, None);
        td.play.scoring = true;
        let mut pick_six = at("g1", 9, "Interception Return Touchdown", 0, None);
        pick_six.play.scoring = true;
        pick_six.play.turnover = true;
        let red = analyze(&[td, pick_six], "Purdue", Zone::Red);

        assert_eq!(red.totals.total_plays, 2);
        assert_eq!(red.totals.touchdowns, 1);
        assert_eq!(red.totals.turnovers, 1);
        assert_eq!(red.breakdowns.by_game[0].touchdowns, red.totals.touchdowns);
        assert_eq!(red.breakdowns.by_game[0].scores, 1);
    }

    #[test]
    fn test_opponent_plays_excluded() {
        let mut theirs = at("g1", 5, "Rush", 5, None);
        theirs.play.offense = "Minnesota".into();
        let analysis = analyze(&[theirs], "Purdue", Zone::Red);
        assert_eq!(analysis.totals.total_plays, 0);
        assert_relative_eq!(analysis.totals.touchdown_rate, 0.0);
        assert_relative_eq!(analysis.totals.avg_ppa, 0.0);
        assert_relative_eq!(analysis.totals.third_down.rate, 0.0);
    }
}
