use serde::Serialize;

use crate::db::{CourseLevel, LevelProgress};

/// True iff every completion criterion of the level is met. All criteria
/// are hard requirements; teacher confirmation only applies when the level
/// asks for it.
pub fn is_complete(level: &CourseLevel, progress: &LevelProgress) -> bool {
    let modules_ok = progress.modules_completed >= level.required_modules_count;
    let artifacts_ok = progress.artifacts_submitted >= level.required_artifacts_count;
    let assessment_ok = progress.assessment_score >= level.required_assessment_score;

    if level.requires_teacher_confirmation {
        return modules_ok && artifacts_ok && assessment_ok && progress.teacher_confirmed;
    }

    modules_ok && artifacts_ok && assessment_ok
}

/// Coarse completion indicator: satisfied criteria over applicable
/// criteria (3, or 4 when teacher confirmation is required), scaled to a
/// percentage and truncated. With 3 criteria the possible values are
/// 0/33/66/100 — a step function, not a progress bar.
pub fn completion_percentage(level: &CourseLevel, progress: &LevelProgress) -> i32 {
    let mut criteria_met = 0;
    let mut total_criteria = 3; // modules, artifacts, assessment

    if progress.modules_completed >= level.required_modules_count {
        criteria_met += 1;
    }
    if progress.artifacts_submitted >= level.required_artifacts_count {
        criteria_met += 1;
    }
    if progress.assessment_score >= level.required_assessment_score {
        criteria_met += 1;
    }

    if level.requires_teacher_confirmation {
        total_criteria += 1;
        if progress.teacher_confirmed {
            criteria_met += 1;
        }
    }

    criteria_met * 100 / total_criteria
}

#[derive(Debug, Clone, Serialize)]
pub struct CriterionStatus {
    pub required: i32,
    pub current: i32,
    pub satisfied: bool,
}

/// Per-criterion status for dashboards.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementsBreakdown {
    pub modules: CriterionStatus,
    pub artifacts: CriterionStatus,
    pub assessment: CriterionStatus,
    /// `Some(confirmed)` when the level requires teacher confirmation.
    pub teacher_confirmation: Option<bool>,
    pub completion_percentage: i32,
    pub complete: bool,
}

pub fn requirements_breakdown(
    level: &CourseLevel,
    progress: &LevelProgress,
) -> RequirementsBreakdown {
    RequirementsBreakdown {
        modules: CriterionStatus {
            required: level.required_modules_count,
            current: progress.modules_completed,
            satisfied: progress.modules_completed >= level.required_modules_count,
        },
        artifacts: CriterionStatus {
            required: level.required_artifacts_count,
            current: progress.artifacts_submitted,
            satisfied: progress.artifacts_submitted >= level.required_artifacts_count,
        },
        assessment: CriterionStatus {
            required: level.required_assessment_score,
            current: progress.assessment_score,
            satisfied: progress.assessment_score >= level.required_assessment_score,
        },
        teacher_confirmation: level
            .requires_teacher_confirmation
            .then_some(progress.teacher_confirmed),
        completion_percentage: completion_percentage(level, progress),
        complete: is_complete(level, progress),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewCourseLevel;
    use uuid::Uuid;

    fn level(modules: i32, artifacts: i32, score: i32, confirm: bool) -> CourseLevel {
        CourseLevel::from_new(
            Uuid::new_v4(),
            1,
            NewCourseLevel {
                name: "Foundations".to_string(),
                description: None,
                learning_outcomes: None,
                required_modules_count: modules,
                required_artifacts_count: artifacts,
                required_assessment_score: score,
                requires_teacher_confirmation: confirm,
            },
        )
    }

    fn progress(
        level: &CourseLevel,
        modules: i32,
        artifacts: i32,
        score: i32,
        confirmed: bool,
    ) -> LevelProgress {
        let mut p = LevelProgress::fresh(Uuid::new_v4(), level.id);
        p.modules_completed = modules;
        p.artifacts_submitted = artifacts;
        p.assessment_score = score;
        p.teacher_confirmed = confirmed;
        p
    }

    #[test]
    fn complete_at_exact_thresholds() {
        let level = level(3, 2, 70, false);
        let p = progress(&level, 3, 2, 70, false);
        assert!(is_complete(&level, &p));
    }

    #[test]
    fn each_criterion_gates_independently() {
        let level = level(3, 2, 70, false);

        let short_modules = progress(&level, 2, 2, 70, false);
        assert!(!is_complete(&level, &short_modules));

        let short_artifacts = progress(&level, 3, 1, 70, false);
        assert!(!is_complete(&level, &short_artifacts));

        let short_score = progress(&level, 3, 2, 69, false);
        assert!(!is_complete(&level, &short_score));
    }

    #[test]
    fn confirmation_gates_when_required() {
        let level = level(3, 2, 70, true);

        let unconfirmed = progress(&level, 3, 2, 70, false);
        assert!(!is_complete(&level, &unconfirmed));

        let confirmed = progress(&level, 3, 2, 70, true);
        assert!(is_complete(&level, &confirmed));
    }

    #[test]
    fn confirmation_ignored_when_not_required() {
        let level = level(3, 2, 70, false);
        let p = progress(&level, 3, 2, 70, false);
        assert!(is_complete(&level, &p));
    }

    #[test]
    fn zero_thresholds_complete_immediately() {
        let level = level(0, 0, 0, false);
        let p = LevelProgress::fresh(Uuid::new_v4(), level.id);
        assert!(is_complete(&level, &p));
        assert_eq!(completion_percentage(&level, &p), 100);
    }

    #[test]
    fn percentage_steps_over_three_criteria() {
        let level = level(3, 2, 70, false);

        assert_eq!(completion_percentage(&level, &progress(&level, 0, 0, 0, false)), 0);
        assert_eq!(completion_percentage(&level, &progress(&level, 3, 0, 0, false)), 33);
        assert_eq!(completion_percentage(&level, &progress(&level, 3, 2, 0, false)), 66);
        assert_eq!(completion_percentage(&level, &progress(&level, 3, 2, 70, false)), 100);
    }

    #[test]
    fn percentage_counts_confirmation_as_fourth_criterion() {
        let level = level(3, 2, 70, true);

        let numeric_only = progress(&level, 3, 2, 70, false);
        assert_eq!(completion_percentage(&level, &numeric_only), 75);

        let confirmed = progress(&level, 3, 2, 70, true);
        assert_eq!(completion_percentage(&level, &confirmed), 100);
    }

    #[test]
    fn breakdown_reflects_each_criterion() {
        let level = level(3, 2, 70, true);
        let p = progress(&level, 3, 1, 80, false);

        let breakdown = requirements_breakdown(&level, &p);
        assert!(breakdown.modules.satisfied);
        assert!(!breakdown.artifacts.satisfied);
        assert!(breakdown.assessment.satisfied);
        assert_eq!(breakdown.teacher_confirmation, Some(false));
        assert_eq!(breakdown.completion_percentage, 50);
        assert!(!breakdown.complete);
    }

    #[test]
    fn breakdown_omits_confirmation_when_not_required() {
        let level = level(3, 2, 70, false);
        let p = progress(&level, 3, 2, 70, false);

        let breakdown = requirements_breakdown(&level, &p);
        assert_eq!(breakdown.teacher_confirmation, None);
        assert!(breakdown.complete);
    }
}
