//! Skill Gap Engine — compares the user's skills against the skills a model says
//! an industry requires.
//!
//! Pure, deterministic, no I/O. Skill identity is case-insensitive and ignores
//! surrounding whitespace.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::insights::{RiskLevel, SkillGapReport};
use crate::models::profile::normalize_skill;

/// Missing-skill counts at which the risk tier steps up. Policy, not data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub medium: usize,
    pub high: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self { medium: 3, high: 6 }
    }
}

impl RiskThresholds {
    pub fn classify(&self, missing: usize) -> RiskLevel {
        if missing >= self.high {
            RiskLevel::High
        } else if missing >= self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Computes the gap between `user_skills` and `required_skills`.
///
/// `missing_skills` is `required_skills` filtered to the entries the user does
/// not have, in the same order. Repeated entries stay repeated; only the
/// summary counts each distinct skill once.
pub fn compute_gap(
    industry: &str,
    user_skills: &[String],
    required_skills: &[String],
    thresholds: &RiskThresholds,
) -> SkillGapReport {
    let have: HashSet<String> = user_skills.iter().map(|s| normalize_skill(s)).collect();

    let missing_skills: Vec<String> = required_skills
        .iter()
        .filter(|skill| !have.contains(&normalize_skill(skill)))
        .cloned()
        .collect();

    let distinct = |skills: &[String]| {
        skills
            .iter()
            .map(|s| normalize_skill(s))
            .filter(|key| !key.is_empty())
            .collect::<HashSet<_>>()
            .len()
    };
    let summary = build_summary(
        industry,
        distinct(&missing_skills),
        distinct(required_skills),
    );

    SkillGapReport {
        industry: industry.to_string(),
        user_skills: user_skills.to_vec(),
        required_skills: required_skills.to_vec(),
        risk_level: thresholds.classify(missing_skills.len()),
        missing_skills,
        summary,
        degraded: false,
    }
}

/// Well-formed report used when the model's required skills could not be read.
pub fn degraded_report(industry: &str, user_skills: &[String], reason: &str) -> SkillGapReport {
    SkillGapReport {
        industry: industry.to_string(),
        user_skills: user_skills.to_vec(),
        required_skills: vec![],
        missing_skills: vec![],
        risk_level: RiskLevel::Low,
        summary: format!(
            "Required skills for {industry} could not be determined ({reason}). Please try again later."
        ),
        degraded: true,
    }
}

fn build_summary(industry: &str, missing: usize, considered: usize) -> String {
    if considered == 0 {
        return format!("No required skills were identified for {industry}.");
    }
    let noun = if considered == 1 { "skill" } else { "skills" };
    if missing == 0 {
        return format!("Your skills cover all {considered} {noun} commonly required in {industry}.");
    }
    format!("You are missing {missing} of {considered} {noun} commonly required in {industry}.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn gap(user: &[&str], required: &[&str]) -> SkillGapReport {
        compute_gap(
            "Data Science",
            &strings(user),
            &strings(required),
            &RiskThresholds::default(),
        )
    }

    #[test]
    fn test_case_insensitive_match() {
        let report = gap(&["Python"], &["python", "SQL"]);
        assert_eq!(report.missing_skills, vec!["SQL"]);
    }

    #[test]
    fn test_whitespace_is_ignored_in_comparison() {
        let report = gap(&["  Machine Learning "], &["machine learning", "Statistics"]);
        assert_eq!(report.missing_skills, vec!["Statistics"]);
    }

    #[test]
    fn test_missing_is_subset_of_required_and_disjoint_from_user() {
        let user = strings(&["Rust", "sql", "Docker"]);
        let required = strings(&["SQL", "Kafka", "rust", "Terraform", "docker ", "Go"]);
        let report = compute_gap("Backend", &user, &required, &RiskThresholds::default());

        let user_keys: HashSet<String> = user.iter().map(|s| normalize_skill(s)).collect();
        for skill in &report.missing_skills {
            assert!(required.contains(skill));
            assert!(!user_keys.contains(&normalize_skill(skill)));
        }
        assert_eq!(report.missing_skills, vec!["Kafka", "Terraform", "Go"]);
    }

    #[test]
    fn test_order_follows_required_skills() {
        let report = gap(&[], &["Spark", "Airflow", "AWS"]);
        assert_eq!(report.missing_skills, vec!["Spark", "Airflow", "AWS"]);
    }

    #[test]
    fn test_risk_tier_boundaries() {
        let t = RiskThresholds::default();
        assert_eq!(t.classify(0), RiskLevel::Low);
        assert_eq!(t.classify(2), RiskLevel::Low);
        assert_eq!(t.classify(3), RiskLevel::Medium);
        assert_eq!(t.classify(5), RiskLevel::Medium);
        assert_eq!(t.classify(6), RiskLevel::High);
        assert_eq!(t.classify(40), RiskLevel::High);
    }

    #[test]
    fn test_thresholds_are_configurable() {
        let t = RiskThresholds { medium: 1, high: 2 };
        let report = compute_gap("Law", &[], &strings(&["Contracts"]), &t);
        assert_eq!(report.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_empty_inputs_are_low_risk() {
        let report = gap(&[], &[]);
        assert!(report.missing_skills.is_empty());
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert_eq!(report.summary, "No required skills were identified for Data Science.");
    }

    #[test]
    fn test_repeated_required_skills_are_kept_by_filter() {
        let report = gap(&[], &["Spark", "spark", "Kafka"]);
        assert_eq!(report.missing_skills, vec!["Spark", "spark", "Kafka"]);
        assert_eq!(report.risk_level, RiskLevel::Medium);
        assert_eq!(
            report.summary,
            "You are missing 2 of 2 skills commonly required in Data Science."
        );
    }

    #[test]
    fn test_repeated_skill_the_user_has_is_filtered_everywhere() {
        let report = gap(&["Spark"], &["Spark", "SPARK ", "Kafka"]);
        assert_eq!(report.missing_skills, vec!["Kafka"]);
        assert_eq!(report.risk_level, RiskLevel::Low);
    }

    #[test]
    fn test_compute_gap_is_idempotent() {
        let a = gap(&["Python", "SQL"], &["Python", "Spark", "SQL", "Kafka"]);
        let b = gap(&["Python", "SQL"], &["Python", "Spark", "SQL", "Kafka"]);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_summary_mentions_count_and_industry() {
        let report = gap(&["Python"], &["Python", "Spark"]);
        assert_eq!(
            report.summary,
            "You are missing 1 of 2 skills commonly required in Data Science."
        );
    }

    #[test]
    fn test_full_coverage_summary() {
        let report = gap(&["Python", "SQL"], &["sql", "PYTHON"]);
        assert!(report.missing_skills.is_empty());
        assert!(report.summary.starts_with("Your skills cover all 2 skills"));
    }

    #[test]
    fn test_user_skills_preserved_as_given() {
        let report = gap(&["Python", "SQL"], &["python"]);
        assert_eq!(report.user_skills, vec!["Python", "SQL"]);
        assert!(!report.degraded);
    }

    #[test]
    fn test_degraded_report_is_well_formed() {
        let report = degraded_report("Data Science", &strings(&["Python"]), "no JSON region found");
        assert!(report.required_skills.is_empty());
        assert!(report.missing_skills.is_empty());
        assert_eq!(report.risk_level, RiskLevel::Low);
        assert!(report.degraded);
        assert!(report.summary.contains("no JSON region found"));
        let json = serde_json::to_value(&report).unwrap();
        assert!(json["missing_skills"].is_array());
    }
}
