use crate::models::{Ballot, Destination};
use crate::voting::{DestinationResult, ResultsReport, VoterScore};

/// Ranks destinations by their mean score across all submitted ballots.
///
/// `ballots` must be in roster order; that order is kept for each
/// destination's vote list and for the `voters` list. Destinations nobody
/// scored stay in the output with an average of 0.
pub fn calculate_results(destinations: &[Destination], ballots: &[(String, Ballot)]) -> ResultsReport {
    let mut ranked: Vec<(u32, DestinationResult)> = destinations
        .iter()
        .map(|destination| {
            let votes: Vec<VoterScore> = ballots
                .iter()
                .filter_map(|(voter, ballot)| {
                    ballot.get(&destination.id).map(|score| VoterScore {
                        voter: voter.clone(),
                        score: score.value(),
                    })
                })
                .collect();

            let sum: u32 = votes.iter().map(|v| v.score as u32).sum();
            let tenths = rounded_tenths(sum, votes.len() as u32);

            let result = DestinationResult {
                destination: destination.clone(),
                average_score: tenths as f64 / 10.0,
                total_votes: votes.len(),
                votes,
            };
            (tenths, result)
        })
        .collect();

    // sort_by is stable: equal averages keep catalog order
    ranked.sort_by(|a, b| b.0.cmp(&a.0));

    let voters: Vec<String> = ballots
        .iter()
        .filter(|(_, ballot)| !ballot.is_empty())
        .map(|(voter, _)| voter.clone())
        .collect();

    ResultsReport {
        results: ranked.into_iter().map(|(_, result)| result).collect(),
        voter_count: voters.len(),
        voters,
    }
}

// Mean in tenths, rounded half away from zero. Integer arithmetic keeps x.x5 exact.
fn rounded_tenths(sum: u32, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    (sum * 20 + count) / (count * 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Score;

    fn catalog(ids: &[&str]) -> Vec<Destination> {
        ids.iter()
            .map(|id| Destination {
                id: id.to_string(),
                name: id.to_uppercase(),
                ..Destination::default()
            })
            .collect()
    }

    fn ballot(scores: &[(&str, i64)]) -> Ballot {
        scores
            .iter()
            .map(|(id, s)| (id.to_string(), Score::new(*s).unwrap()))
            .collect()
    }

    fn single(scores: &[i64]) -> ResultsReport {
        let ballots: Vec<(String, Ballot)> = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("voter{}", i), ballot(&[("x", *s)])))
            .collect();
        calculate_results(&catalog(&["x"]), &ballots)
    }

    fn order(report: &ResultsReport) -> Vec<&str> {
        report.results.iter().map(|r| r.destination.id.as_str()).collect()
    }

    #[test]
    fn family_scenario() {
        let ballots = vec![
            ("A".to_string(), ballot(&[("x", 10), ("y", 5), ("z", 1)])),
            ("B".to_string(), ballot(&[("x", 8), ("y", 5)])),
        ];
        let report = calculate_results(&catalog(&["x", "y", "z"]), &ballots);

        assert_eq!(order(&report), vec!["x", "y", "z"]);
        assert_eq!(report.results[0].average_score, 9.0);
        assert_eq!(report.results[1].average_score, 5.0);
        assert_eq!(report.results[2].average_score, 1.0);
        assert_eq!(
            report.results[0].votes,
            vec![
                VoterScore { voter: "A".into(), score: 10 },
                VoterScore { voter: "B".into(), score: 8 },
            ]
        );
        assert_eq!(report.results[2].total_votes, 1);
        assert_eq!(report.results[2].votes[0].voter, "A");
        assert_eq!(report.voter_count, 2);
        assert_eq!(report.voters, vec!["A", "B"]);
    }

    #[test]
    fn unvoted_destinations_are_kept_at_zero() {
        let ballots = vec![("A".to_string(), ballot(&[("y", 3)]))];
        let report = calculate_results(&catalog(&["x", "y", "z"]), &ballots);

        assert_eq!(order(&report), vec!["y", "x", "z"]);
        for result in &report.results[1..] {
            assert_eq!(result.average_score, 0.0);
            assert!(result.votes.is_empty());
            assert_eq!(result.total_votes, 0);
        }
    }

    #[test]
    fn no_ballots_at_all() {
        let report = calculate_results(&catalog(&["x", "y"]), &[]);
        assert_eq!(order(&report), vec!["x", "y"]);
        assert_eq!(report.voter_count, 0);
        assert!(report.voters.is_empty());
    }

    #[test]
    fn exact_means() {
        assert_eq!(single(&[8, 6, 4]).results[0].average_score, 6.0);
        assert_eq!(single(&[7, 8]).results[0].average_score, 7.5);
    }

    #[test]
    fn rounds_to_one_decimal_half_away_from_zero() {
        // 29 / 4 = 7.25
        assert_eq!(single(&[7, 7, 7, 8]).results[0].average_score, 7.3);
        // 5 / 3 = 1.666..
        assert_eq!(single(&[1, 2, 2]).results[0].average_score, 1.7);
        // 4 / 3 = 1.333..
        assert_eq!(single(&[1, 1, 2]).results[0].average_score, 1.3);
    }

    #[test]
    fn ties_keep_catalog_order() {
        let ballots = vec![
            ("A".to_string(), ballot(&[("a", 6), ("b", 9), ("c", 6), ("d", 9)])),
            ("B".to_string(), ballot(&[("a", 6), ("b", 9), ("c", 6), ("d", 9)])),
        ];
        let report = calculate_results(&catalog(&["a", "b", "c", "d"]), &ballots);
        assert_eq!(order(&report), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn ties_are_judged_on_rounded_means() {
        // 7.25 and 7.3 both display as 7.3, so catalog order decides
        let ballots = vec![
            ("A".to_string(), ballot(&[("p", 7), ("q", 7)])),
            ("B".to_string(), ballot(&[("p", 7), ("q", 7)])),
            ("C".to_string(), ballot(&[("p", 7), ("q", 8)])),
            ("D".to_string(), ballot(&[("p", 8)])),
        ];
        let report = calculate_results(&catalog(&["p", "q"]), &ballots);
        assert_eq!(report.results[0].average_score, 7.3);
        assert_eq!(report.results[1].average_score, 7.3);
        assert_eq!(order(&report), vec!["p", "q"]);
    }

    #[test]
    fn voters_follow_ballot_order() {
        let ballots = vec![
            ("Szandra".to_string(), ballot(&[("x", 2)])),
            ("Tomi".to_string(), ballot(&[("x", 4)])),
        ];
        let report = calculate_results(&catalog(&["x"]), &ballots);
        assert_eq!(report.voters, vec!["Szandra", "Tomi"]);
        assert_eq!(report.results[0].votes[0].voter, "Szandra");
        assert_eq!(report.results[0].average_score, 3.0);
    }
}
