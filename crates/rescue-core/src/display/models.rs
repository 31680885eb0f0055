//! Display implementations for domain models.

use std::fmt;

use super::datetime::LocalDateTime;
use crate::models::{CachedPlan, Incident, IncidentManifest, Plan, PlanManifest, UpdateEntry};

fn write_bullets(f: &mut fmt::Formatter<'_>, heading: &str, items: &[String]) -> fmt::Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(f, "## {heading}")?;
    writeln!(f)?;
    for item in items {
        writeln!(f, "- {item}")?;
    }
    writeln!(f)
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Response Plan")?;
        writeln!(f)?;

        if !self.generated_at.is_empty() {
            writeln!(f, "- Generated: {}", LocalDateTime(&self.generated_at))?;
        }
        let scenario = &self.scenario;
        match (scenario.kind.is_empty(), scenario.location.is_empty()) {
            (false, false) => writeln!(f, "- Scenario: {} at {}", scenario.kind, scenario.location)?,
            (false, true) => writeln!(f, "- Scenario: {}", scenario.kind)?,
            (true, false) => writeln!(f, "- Location: {}", scenario.location)?,
            (true, true) => {}
        }
        if scenario.population > 0 {
            writeln!(f, "- Affected: {}", scenario.population)?;
        }

        if !self.summary.is_empty() {
            writeln!(f)?;
            writeln!(f, "{}", self.summary)?;
        }
        writeln!(f)?;

        if !self.priorities.is_empty() {
            writeln!(f, "## Priorities")?;
            writeln!(f)?;
            for (i, priority) in self.priorities.iter().enumerate() {
                writeln!(f, "{}. {priority}", i + 1)?;
            }
            writeln!(f)?;
        }

        write_bullets(f, "Key Actions", &self.actions)?;
        write_bullets(f, "Resource Allocation", &self.resources_plan)?;
        write_bullets(f, "Risks", &self.risks)
    }
}

impl fmt::Display for CachedPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match Plan::from_value(&self.plan) {
            Some(plan) => write!(f, "{plan}")?,
            None => writeln!(f, "```json\n{:#}\n```\n", self.plan)?,
        }
        writeln!(
            f,
            "*Model {} at {}*",
            self.meta.model,
            LocalDateTime(&self.meta.generated_at)
        )
    }
}

impl fmt::Display for UpdateEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.resolved { "x" } else { " " };
        write!(f, "- [{mark}] {} ({})", self.text, LocalDateTime(&self.ts))
    }
}

impl fmt::Display for Incident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = if self.name.is_empty() { &self.id } else { &self.name };
        writeln!(f, "# {title}")?;
        writeln!(f)?;

        writeln!(f, "- ID: {}", self.id)?;
        writeln!(f, "- Type: {}", self.kind)?;
        writeln!(f, "- Status: {}", self.status)?;
        if self.population > 0 {
            writeln!(f, "- Population: {}", self.population)?;
        }
        if self.lat != 0.0 || self.lng != 0.0 {
            writeln!(f, "- Location: {:.4}, {:.4}", self.lat, self.lng)?;
        }
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;

        for (label, text) in [
            ("Details", &self.details),
            ("Resources", &self.resources),
            ("Constraints", &self.constraints),
        ] {
            if !text.is_empty() {
                writeln!(f, "\n## {label}\n\n{text}")?;
            }
        }

        if self.updates.is_empty() {
            writeln!(f, "\nNo updates for this incident.")?;
        } else {
            writeln!(
                f,
                "\n## Updates ({} open)\n",
                self.open_update_count()
            )?;
            for update in &self.updates {
                writeln!(f, "{update}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for IncidentManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.incidents.is_empty() {
            return writeln!(f, "No incidents found.");
        }
        writeln!(f, "# Incidents")?;
        writeln!(f)?;
        for entry in &self.incidents {
            writeln!(f, "- **{}** ({})", entry.id, entry.file)?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanManifest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.plans.is_empty() {
            return writeln!(f, "No cached plans found.");
        }
        writeln!(f, "# Cached Plans")?;
        writeln!(f)?;
        for entry in &self.plans {
            writeln!(
                f,
                "- **{}** updated {}",
                entry.id,
                LocalDateTime(&entry.updated_at)
            )?;
        }
        Ok(())
    }
}
