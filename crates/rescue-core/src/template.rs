//! Deterministic offline plan drafting.
//!
//! Produces a plan with the same shape the model returns, from keyword rules
//! alone. Backs the offline `plan draft` command.

use std::sync::LazyLock;

use jiff::Timestamp;
use regex::Regex;

use crate::models::{Incident, Plan, PlanInputs, ScenarioInput, UpdateEntry};

/// At most this many updates are turned into actions.
const MAX_UPDATE_ACTIONS: usize = 5;

const REASSESSMENT_ACTION: &str = "Establish a 2-4 hour reassessment cycle and update plan";

/// Everything a drafted plan is built from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftInput {
    pub scenario: ScenarioInput,
    /// Comma, semicolon or newline separated list
    pub resources: String,
    /// Comma, semicolon or newline separated list
    pub constraints: String,
    pub updates: Vec<UpdateEntry>,
}

impl From<&Incident> for DraftInput {
    fn from(incident: &Incident) -> Self {
        Self {
            scenario: ScenarioInput {
                kind: incident.kind.clone(),
                location: incident.name.clone(),
                population: incident.population,
                details: incident.details.clone(),
            },
            resources: incident.resources.clone(),
            constraints: incident.constraints.clone(),
            updates: incident.updates.iter().filter(|u| !u.resolved).cloned().collect(),
        }
    }
}

static MEDICAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(critical|injur\w*|wound\w*|medic\w*|ambulance\w*|triage)\b").expect("medical pattern")
});
static ACCESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(bridge|road|highway|access|route).*(closed|blocked|down)").expect("access pattern")
});
static POWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(power|electric|grid).*out(age)?").expect("power pattern"));
static SHELTER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(shelter|center|gym).*\b(open|capacity|full)\b").expect("shelter pattern")
});
static WATER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"water.*\b(boil|unsafe|contaminat)").expect("water pattern"));
static FIRST_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("number pattern"));

/// Splits a free-form list on commas, semicolons and newlines.
pub fn split_list(text: &str) -> Vec<String> {
    text.split([',', ';', '\n'])
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turns an update into an imperative action, or `None` for blank text.
pub fn update_to_action(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let lower = text.to_lowercase();

    let action = if MEDICAL.is_match(&lower) {
        match FIRST_NUMBER.find(text) {
            Some(n) => format!(
                "Dispatch medical teams to treat ~{} critical patients; establish triage and transport to nearest care.",
                n.as_str()
            ),
            None => "Dispatch medical teams; establish triage and transport to nearest care.".to_string(),
        }
    } else if ACCESS.is_match(&lower) {
        "Reroute evacuations and logistics; update detours and communicate alternate routes.".to_string()
    } else if POWER.is_match(&lower) {
        "Deploy generators and lighting to critical facilities; prioritize vulnerable areas.".to_string()
    } else if SHELTER.is_match(&lower) {
        "Open additional shelters or expand capacity; ensure intake, sanitation, and supplies.".to_string()
    } else if WATER.is_match(&lower) {
        "Issue boil-water advisory; distribute bottled water and purification kits.".to_string()
    } else {
        format!("Act on update: {text}")
    };
    Some(action)
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle))
}

fn priorities(scenario: &ScenarioInput) -> Vec<String> {
    let mut priorities = Vec::new();
    let kind = &scenario.kind;

    if contains_any(kind, &["flood"]) || contains_any(&scenario.details, &["flood"]) {
        priorities.push("Evacuate low-lying areas and establish safe shelter routes".to_string());
    }
    if contains_any(kind, &["fire"]) || contains_any(&scenario.details, &["smoke"]) {
        priorities.push("Protect life near fire line and secure clean air zones".to_string());
    }
    if contains_any(kind, &["earthquake"]) {
        priorities.push("Assess structural damage and cordon unsafe buildings".to_string());
    }
    if contains_any(kind, &["hurricane", "storm"]) {
        priorities.push("Secure shelters, pre-position supplies, and prepare for power loss".to_string());
    }
    if scenario.population > 0 {
        priorities.push(format!(
            "Triage and support approximately {} affected individuals",
            scenario.population
        ));
    }
    if priorities.is_empty() {
        priorities.push("Stabilize immediate threats to life and secure essential services".to_string());
    }
    priorities
}

fn resources_plan(resources: &[String]) -> Vec<String> {
    let any = |needles: &[&str]| resources.iter().any(|r| contains_any(r, needles));
    let mut plan = Vec::new();

    if any(&["medic", "emt", "ambulance"]) {
        plan.push("Deploy medical teams to triage points near affected zones".to_string());
    }
    if any(&["volunteer", "team", "staff"]) {
        plan.push("Assign volunteers to door-to-door checks and supply lines".to_string());
    }
    if any(&["shelter", "center", "hall"]) {
        plan.push("Stand up shelters with intake, supplies, and sanitation".to_string());
    }
    if plan.is_empty() {
        plan.push("Request additional resources via mutual aid and NGO partners".to_string());
    }
    plan
}

fn risks(constraints: &[String]) -> Vec<String> {
    let any = |needles: &[&str]| constraints.iter().any(|c| contains_any(c, needles));
    let mut risks = Vec::new();

    if any(&["bridge", "road", "access"]) {
        risks.push("Limited road access may delay evacuations".to_string());
    }
    if any(&["power", "electric"]) {
        risks.push("Power outages could impact medical and communications capacity".to_string());
    }
    if risks.is_empty() {
        risks.push("Monitor evolving conditions and secondary hazards".to_string());
    }
    risks
}

fn summary(scenario: &ScenarioInput) -> String {
    let location = if scenario.location.is_empty() {
        "the affected area"
    } else {
        scenario.location.as_str()
    };
    let affected = if scenario.population > 0 {
        format!("{} people affected. ", scenario.population)
    } else {
        String::new()
    };
    format!("{} in {location}. {affected}{}", scenario.kind, scenario.details)
        .trim()
        .to_string()
}

/// Drafts a plan from keyword rules.
pub fn draft_plan(input: &DraftInput) -> Plan {
    let resources = split_list(&input.resources);
    let constraints = split_list(&input.constraints);

    let mut actions = Vec::new();
    if !resources.is_empty() {
        actions.push(format!("Allocate available resources: {}", resources.join("; ")));
    }
    if !constraints.is_empty() {
        actions.push(format!("Mitigate constraints: {}", constraints.join("; ")));
    }
    actions.extend(
        input
            .updates
            .iter()
            .take(MAX_UPDATE_ACTIONS)
            .filter_map(|u| update_to_action(&u.text)),
    );
    actions.push(REASSESSMENT_ACTION.to_string());

    Plan {
        generated_at: Timestamp::now().to_string(),
        scenario: input.scenario.clone(),
        summary: summary(&input.scenario),
        priorities: priorities(&input.scenario),
        actions,
        resources_plan: resources_plan(&resources),
        risks: risks(&constraints),
        inputs: PlanInputs {
            resources,
            constraints,
            updates: input.updates.clone(),
        },
    }
}
