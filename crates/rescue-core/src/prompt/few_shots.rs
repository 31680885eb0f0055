//! Versioned prompt content: the system instruction and worked examples.

use serde_json::{Value, json};

/// Bumped whenever the instruction or any example changes.
pub const TEMPLATE_VERSION: &str = "2025-09-11.1";

pub const SYSTEM_INSTRUCTION: &str = r#"You are Rescue Planner, a cautious and pragmatic emergency planning assistant.
Return ONLY strict JSON matching the schema below. No markdown, no commentary, no code fences.
Schema:
{
  "generatedAt": ISO8601,
  "scenario": {"type": string, "location": string, "population": number, "details": string},
  "inputs": {"resources": string[], "constraints": string[], "updates": {"text": string, "ts": string}[]},
  "summary": string,
  "priorities": string[],
  "actions": string[],
  "resourcesPlan": string[],
  "risks": string[]
}
Rules:
- Be pragmatic and safety-conscious.
- Reflect the constraints and the crowd updates.
- Turn updates into concrete actions. Never repeat them verbatim or write phrases like "Incorporate update".
- Merge overlapping or duplicate updates and quantify where possible.
- Never reveal private data: redact any emails, phone numbers, addresses or other sensitive details in the output.
- Allocate resources equitably, without bias by wealth, race or status.
- Keep items short, imperative and actionable, with 4-7 items per list.
- When information is missing, make conservative assumptions and state them in the summary.
- Output valid JSON only, with no surrounding text."#;

/// Worked (input, output) pairs shown to the model before the real request.
pub fn examples() -> Vec<(Value, Value)> {
    vec![flood_evacuation(), wildfire_access(), hurricane_medical()]
}

fn flood_evacuation() -> (Value, Value) {
    let scenario = json!({
        "type": "Flood",
        "location": "Riverside Town",
        "population": 500,
        "details": "Rising river, low-lying areas inundated."
    });
    let updates = json!([{ "text": "Bridge A closed", "ts": "2025-09-11T10:00:00Z" }]);

    let input = json!({ "scenario": scenario, "updates": updates, "options": {} });
    let output = json!({
        "generatedAt": "2025-09-11T10:05:00Z",
        "scenario": scenario,
        "inputs": { "resources": [], "constraints": ["Bridge A closed"], "updates": updates },
        "summary": "Flood in Riverside Town. 500 people affected. Bridge A is closed; evacuate low-lying areas and route via open roads.",
        "priorities": [
            "Evacuate low-lying neighborhoods",
            "Open and staff shelters with intake",
            "Set up triage near affected zones",
            "Secure clean water and sanitation"
        ],
        "actions": [
            "Close unsafe roads and mark detours",
            "Coordinate door-to-door checks by teams",
            "Deliver bottled water and basic supplies",
            "Plan reassessment in 2-4 hours"
        ],
        "resourcesPlan": [
            "Assign volunteers to welfare checks and supply runs",
            "Deploy medics to triage points near shelters"
        ],
        "risks": [
            "Limited road access may delay evacuations",
            "Secondary flooding if rainfall continues"
        ]
    });
    (input, output)
}

fn wildfire_access() -> (Value, Value) {
    let scenario = json!({
        "type": "Wildfire",
        "location": "Foothills",
        "population": 1200,
        "details": "Winds shifting; smoke affecting suburbs."
    });
    let updates = json!([{ "text": "One-lane access road", "ts": "2025-09-10T18:30:00Z" }]);

    let input = json!({ "scenario": scenario, "updates": updates, "options": {} });
    let output = json!({
        "generatedAt": "2025-09-10T18:35:00Z",
        "scenario": scenario,
        "inputs": { "resources": [], "constraints": ["One-lane access road"], "updates": updates },
        "summary": "Wildfire near Foothills. 1200 affected by smoke and potential spread; access is limited to one lane.",
        "priorities": [
            "Protect life at the fire line and evacuate at-risk homes",
            "Establish clean-air shelters and distribute masks",
            "Stage resources for rapid containment"
        ],
        "actions": [
            "Set traffic control for the one-lane road",
            "Distribute N95 masks at community centers",
            "Alert clinics for respiratory cases",
            "Reassess perimeter and winds every 2 hours"
        ],
        "resourcesPlan": [
            "Assign engines and water tenders to protect structures",
            "Volunteers handle mask distribution and welfare checks"
        ],
        "risks": [
            "Road bottlenecks may slow evacuations",
            "Shifting winds can accelerate fire spread"
        ]
    });
    (input, output)
}

fn hurricane_medical() -> (Value, Value) {
    let scenario = json!({
        "type": "Hurricane",
        "location": "Coastal City",
        "population": 3200,
        "details": "Storm surge risk; shelters being prepared."
    });
    let updates = json!([{
        "text": "10 people are in critical condition and need immediate medical help",
        "ts": "2025-09-11T09:30:00Z"
    }]);

    let input = json!({ "scenario": scenario, "updates": updates, "options": {} });
    let output = json!({
        "generatedAt": "2025-09-11T09:35:00Z",
        "scenario": scenario,
        "inputs": { "resources": [], "constraints": [], "updates": updates },
        "summary": "Coastal City preparing for storm surge; immediate medical support required for critical patients.",
        "priorities": [
            "Stabilize critical patients",
            "Open and staff shelters",
            "Pre-position supplies and medical support"
        ],
        "actions": [
            "Dispatch medical teams and ambulances to treat ~10 critical patients; establish triage",
            "Coordinate transport to nearest hospitals",
            "Reassess in 2-4 hours"
        ],
        "resourcesPlan": [
            "Assign medics to triage stations near shelters",
            "Ensure ambulance availability and routes"
        ],
        "risks": [
            "Hospital capacity constraints",
            "Power loss impacting medical equipment"
        ]
    });
    (input, output)
}
