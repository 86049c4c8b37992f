//! Advisory pathway scoring. Stateless: consumes learner signals the
//! request layer has already gathered and produces a score, a gate and
//! at most two recommended next moves. Not part of the promotion engine.

use serde::{Deserialize, Serialize};

/// Learner signals on a 0-100 scale, except `breadth` (count of distinct
/// pathways touched).
#[derive(Debug, Clone, Deserialize)]
pub struct PathwayInputs {
    pub interest_persistence: i32,
    pub skill_readiness: i32,
    pub enjoyment: i32,
    pub local_demand: i32,
    pub breadth: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gate {
    Green,
    Amber,
    Red,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MoveKind {
    Bridge,
    Showcase,
    Explore,
    Deepen,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextMove {
    pub kind: MoveKind,
    pub title: String,
    pub description: String,
}

/// Weighted pathway score: 0.4*Interest + 0.3*Skill + 0.2*Enjoyment +
/// 0.1*Demand, clamped to 0-100.
pub fn calculate_pathway_score(inputs: &PathwayInputs) -> i32 {
    let score = 0.4 * inputs.interest_persistence as f64
        + 0.3 * inputs.skill_readiness as f64
        + 0.2 * inputs.enjoyment as f64
        + 0.1 * inputs.local_demand as f64;
    score.clamp(0.0, 100.0).round() as i32
}

/// GREEN: score >= 70 and skill >= 60 and positive mood.
/// AMBER: score >= 50. RED: everything else.
pub fn determine_gate(score: i32, skill_readiness: i32, has_positive_mood: bool) -> Gate {
    if score >= 70 && skill_readiness >= 60 && has_positive_mood {
        Gate::Green
    } else if score >= 50 {
        Gate::Amber
    } else {
        Gate::Red
    }
}

/// Top two next moves, in priority order: bridge a gap, showcase work,
/// explore breadth, deepen expertise.
pub fn recommend_next_moves(
    inputs: &PathwayInputs,
    artifact_count: i64,
    gate: Gate,
) -> Vec<NextMove> {
    let mut recommendations = Vec::new();

    if matches!(gate, Gate::Amber | Gate::Red) {
        recommendations.push(NextMove {
            kind: MoveKind::Bridge,
            title: "Bridge the Gap".to_string(),
            description: "Focus on building foundational skills and addressing gaps"
                .to_string(),
        });
    }

    if artifact_count >= 2 && inputs.enjoyment >= 60 {
        recommendations.push(NextMove {
            kind: MoveKind::Showcase,
            title: "Showcase Your Work".to_string(),
            description: format!("You have {} artifacts ready to showcase", artifact_count),
        });
    }

    if inputs.breadth <= 2 && inputs.enjoyment >= 60 {
        recommendations.push(NextMove {
            kind: MoveKind::Explore,
            title: "Explore New Pathways".to_string(),
            description: "Try new modules and expand your interests".to_string(),
        });
    }

    if inputs.interest_persistence >= 70 && inputs.skill_readiness >= 70 {
        recommendations.push(NextMove {
            kind: MoveKind::Deepen,
            title: "Deepen Your Expertise".to_string(),
            description: "Build on your strong foundation with advanced work".to_string(),
        });
    }

    recommendations.truncate(2);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(interest: i32, skill: i32, enjoyment: i32, demand: i32, breadth: i32) -> PathwayInputs {
        PathwayInputs {
            interest_persistence: interest,
            skill_readiness: skill,
            enjoyment,
            local_demand: demand,
            breadth,
        }
    }

    #[test]
    fn score_is_the_weighted_sum() {
        assert_eq!(calculate_pathway_score(&inputs(80, 70, 60, 50, 3)), 70);
        assert_eq!(calculate_pathway_score(&inputs(100, 100, 100, 100, 3)), 100);
        assert_eq!(calculate_pathway_score(&inputs(0, 0, 0, 0, 0)), 0);
    }

    #[test]
    fn score_rounds_to_nearest_integer() {
        // 0.4*51 + 0.3*49 + 0.2*50 + 0.1*50 = 50.1
        assert_eq!(calculate_pathway_score(&inputs(51, 49, 50, 50, 3)), 50);
    }

    #[test]
    fn gate_boundaries() {
        assert_eq!(determine_gate(70, 60, true), Gate::Green);
        assert_eq!(determine_gate(70, 59, true), Gate::Amber);
        assert_eq!(determine_gate(70, 60, false), Gate::Amber);
        assert_eq!(determine_gate(50, 100, true), Gate::Amber);
        assert_eq!(determine_gate(49, 100, true), Gate::Red);
    }

    #[test]
    fn bridge_comes_first_for_amber() {
        let moves = recommend_next_moves(&inputs(80, 80, 80, 80, 1), 3, Gate::Amber);
        assert_eq!(moves.len(), 2);
        assert_eq!(moves[0].kind, MoveKind::Bridge);
        assert_eq!(moves[1].kind, MoveKind::Showcase);
    }

    #[test]
    fn green_gate_skips_bridge() {
        let moves = recommend_next_moves(&inputs(80, 80, 80, 80, 1), 3, Gate::Green);
        assert_eq!(moves[0].kind, MoveKind::Showcase);
        assert_eq!(moves[1].kind, MoveKind::Explore);
    }

    #[test]
    fn deepen_requires_interest_and_skill() {
        let moves = recommend_next_moves(&inputs(80, 80, 0, 0, 5), 0, Gate::Green);
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].kind, MoveKind::Deepen);
    }

    #[test]
    fn at_most_two_recommendations() {
        let moves = recommend_next_moves(&inputs(80, 80, 80, 80, 1), 3, Gate::Red);
        assert_eq!(moves.len(), 2);
    }
}
