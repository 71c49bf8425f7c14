//! Built-in synthetic careers for validation runs and tests.
//!
//! Two reference entities exercise the two modes of the engine:
//! a rescue-eligible entity with three category changes and binding maxima,
//! and a plain entity with a single late change.

use crate::density::forward::CareerRequest;
use crate::tables::{CapModifiers, CategoryData, EntityProfile, RateTables};
use crate::types::{AttributeArray, Career, CategoryChange, RateVector};

/// A named career request.
#[derive(Clone, Debug)]
pub struct Scenario {
    pub name: &'static str,
    pub request: CareerRequest,
}

fn category(rate_modifier: RateVector, floor: AttributeArray, bonus: AttributeArray) -> CategoryData {
    CategoryData {
        rate_modifier,
        floor,
        bonus,
    }
}

/// Category table shared by every built-in scenario.
pub fn demo_tables() -> RateTables {
    RateTables::new()
        .with_category("Recruit", CategoryData::neutral())
        .with_category(
            "Skyrider",
            category(
                [0.0, -0.1, 0.0, 0.1, 0.1, 0.0, -0.1, 0.1, 0.1],
                [20, 8, 6, 10, 10, 0, 5, 5, 7],
                [0, 0, 0, 0, 1, 0, 0, 0, 0],
            ),
        )
        .with_category(
            "Lancer",
            category(
                [0.1, 0.1, 0.0, 0.0, 0.0, 0.0, 0.1, -0.1, 0.0],
                [28, 14, 4, 10, 9, 0, 12, 3, 5],
                [0, 1, 0, 0, 0, 0, 1, 0, 0],
            ),
        )
        .with_category(
            "Falconer",
            category(
                [0.0, 0.0, 0.1, 0.1, 0.2, 0.0, -0.1, 0.1, 0.2],
                [35, 15, 10, 16, 20, 0, 9, 14, 16],
                [0, 0, 0, 0, 2, 0, 0, 1, 1],
            ),
        )
        .with_category(
            "Marksman",
            category(
                [0.0, 0.0, 0.0, 0.2, 0.1, 0.0, 0.0, 0.0, 0.0],
                [26, 12, 2, 16, 10, 0, 7, 1, 6],
                [0, 0, 0, 1, 0, 0, 0, 0, 0],
            ),
        )
        .with_category(
            "Ranger",
            category(
                [0.1, 0.0, 0.0, 0.2, 0.1, 0.0, 0.0, 0.0, 0.1],
                [30, 14, 8, 18, 14, 0, 8, 6, 12],
                [0, 0, 0, 2, 1, 0, 0, 0, 0],
            ),
        )
}

/// Rescue-eligible entity, four categories, maxima that bind late.
pub fn student() -> Scenario {
    Scenario {
        name: "student",
        request: CareerRequest {
            profile: EntityProfile {
                base_rates: [0.55, 0.45, 0.30, 0.45, 0.55, 0.45, 0.35, 0.35, 0.45],
                rescue_eligible: true,
                max_base_values: [75, 30, 30, 30, 30, 30, 30, 30, 30],
            },
            career: Career {
                start_step: 5,
                start_category: "Recruit".into(),
                start_values: [22, 9, 7, 9, 10, 8, 6, 9, 10],
                changes: vec![
                    CategoryChange::new(10, "Skyrider"),
                    CategoryChange::new(20, "Lancer"),
                    CategoryChange::new(30, "Falconer"),
                ],
                end_step: 45,
            },
            cap_modifiers: CapModifiers::default(),
        },
    }
}

/// Plain entity with one change and every cap modifier enabled.
pub fn veteran() -> Scenario {
    Scenario {
        name: "veteran",
        request: CareerRequest {
            profile: EntityProfile {
                base_rates: [0.40, 0.45, 0.15, 0.50, 0.35, 0.40, 0.30, 0.15, 0.25],
                rescue_eligible: false,
                max_base_values: [80, 40, 40, 40, 40, 40, 40, 40, 40],
            },
            career: Career {
                start_step: 11,
                start_category: "Marksman".into(),
                start_values: [33, 18, 8, 21, 14, 17, 12, 8, 10],
                changes: vec![CategoryChange::new(30, "Ranger")],
                end_step: 41,
            },
            cap_modifiers: CapModifiers::all(),
        },
    }
}

pub fn all() -> Vec<Scenario> {
    vec![student(), veteran()]
}
