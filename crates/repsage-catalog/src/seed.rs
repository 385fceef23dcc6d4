//! Built-in seed catalog.
//!
//! Covers the fallback exercise of every movement-pattern rule so the
//! classification tier can always resolve against a fresh install.

use repsage_core::ExerciseRecord;

use crate::types::CatalogEntry;

struct Seed {
    name: &'static str,
    aliases: &'static [&'static str],
    target: &'static [&'static str],
    secondary: &'static [&'static str],
    equipment: &'static [&'static str],
    instructions: &'static [&'static str],
}

const SEEDS: &[Seed] = &[
    Seed {
        name: "Push Up",
        aliases: &["pushup", "press up"],
        target: &["chest"],
        secondary: &["triceps", "shoulders", "core"],
        equipment: &["bodyweight"],
        instructions: &[
            "Start in a high plank with hands slightly wider than shoulders.",
            "Lower your chest toward the floor, elbows at about 45 degrees.",
            "Keep your body in a straight line from head to heels.",
            "Press back up until your arms are straight.",
        ],
    },
    Seed {
        name: "Squat",
        aliases: &["bodyweight squat", "air squat"],
        target: &["quads", "glutes"],
        secondary: &["hamstrings", "core"],
        equipment: &["bodyweight"],
        instructions: &[
            "Stand with feet shoulder-width apart, toes slightly out.",
            "Push your hips back and bend your knees to lower down.",
            "Keep your chest up and knees tracking over your toes.",
            "Drive through your heels to stand back up.",
        ],
    },
    Seed {
        name: "Deadlift",
        aliases: &["conventional deadlift", "barbell deadlift"],
        target: &["hamstrings", "glutes"],
        secondary: &["lower back", "forearms"],
        equipment: &["barbell"],
        instructions: &[
            "Stand with the bar over mid-foot, feet hip-width apart.",
            "Hinge at the hips and grip the bar just outside your knees.",
            "Brace your core and keep your back flat.",
            "Drive through the floor and extend your hips to stand tall.",
            "Lower the bar under control by pushing the hips back.",
        ],
    },
    Seed {
        name: "Pull Up",
        aliases: &["pullup"],
        target: &["lats"],
        secondary: &["biceps", "rear delts"],
        equipment: &["pull-up bar"],
        instructions: &[
            "Hang from the bar with an overhand grip, hands shoulder-width apart.",
            "Pull your shoulder blades down and back.",
            "Pull until your chin clears the bar.",
            "Lower under control to a full hang.",
        ],
    },
    Seed {
        name: "Russian Twist",
        aliases: &[],
        target: &["obliques"],
        secondary: &["abs", "hip flexors"],
        equipment: &["bodyweight"],
        instructions: &[
            "Sit with knees bent and lean back slightly, chest up.",
            "Rotate your torso to one side, bringing your hands beside your hip.",
            "Rotate to the other side with control.",
        ],
    },
    Seed {
        name: "Farmer Carry",
        aliases: &["farmers walk", "farmer walk"],
        target: &["forearms", "traps"],
        secondary: &["core", "glutes"],
        equipment: &["dumbbell"],
        instructions: &[
            "Pick up a heavy weight in each hand with a neutral grip.",
            "Stand tall with shoulders back and core braced.",
            "Walk with short, controlled steps for the set distance.",
            "Set the weights down by squatting, not rounding your back.",
        ],
    },
    Seed {
        name: "Plank",
        aliases: &["front plank", "forearm plank"],
        target: &["abs"],
        secondary: &["shoulders", "glutes"],
        equipment: &["bodyweight"],
        instructions: &[
            "Rest on your forearms with elbows under your shoulders.",
            "Extend your legs and lift your hips into a straight line.",
            "Squeeze your glutes and brace your core.",
            "Hold without letting your hips sag.",
        ],
    },
    Seed {
        name: "Bench Press",
        aliases: &["barbell bench press"],
        target: &["chest"],
        secondary: &["triceps", "shoulders"],
        equipment: &["barbell", "bench"],
        instructions: &[
            "Lie on the bench with eyes under the bar, feet flat on the floor.",
            "Grip the bar slightly wider than shoulder-width.",
            "Lower the bar to your mid-chest with control.",
            "Press the bar back up to straight arms.",
        ],
    },
    Seed {
        name: "Bent Over Row",
        aliases: &["barbell row"],
        target: &["upper back", "lats"],
        secondary: &["biceps", "rear delts"],
        equipment: &["barbell"],
        instructions: &[
            "Hinge forward with a flat back, holding the bar at arm's length.",
            "Pull the bar toward your lower ribs, squeezing your shoulder blades.",
            "Lower the bar under control.",
        ],
    },
    Seed {
        name: "Goblet Squat",
        aliases: &["dumbbell goblet squat", "kettlebell goblet squat"],
        target: &["quads", "glutes"],
        secondary: &["core", "upper back"],
        equipment: &["dumbbell"],
        instructions: &[
            "Hold a dumbbell vertically against your chest.",
            "Sit down between your knees, keeping your chest up.",
            "Pause at the bottom, then drive up through your heels.",
        ],
    },
    Seed {
        name: "Walking Lunge",
        aliases: &["lunge"],
        target: &["quads", "glutes"],
        secondary: &["hamstrings", "calves"],
        equipment: &["bodyweight"],
        instructions: &[
            "Step forward and lower until both knees are bent about 90 degrees.",
            "Keep your front knee over your ankle.",
            "Push through the front heel and step into the next lunge.",
        ],
    },
    Seed {
        name: "Glute Bridge",
        aliases: &["hip bridge"],
        target: &["glutes"],
        secondary: &["hamstrings", "core"],
        equipment: &["bodyweight"],
        instructions: &[
            "Lie on your back with knees bent and feet flat.",
            "Drive through your heels to lift your hips.",
            "Squeeze your glutes at the top, then lower slowly.",
        ],
    },
];

/// Seed entries with stable ids (`seed-0001`, ...) and visual references.
pub fn seed_entries() -> Vec<CatalogEntry> {
    SEEDS
        .iter()
        .enumerate()
        .map(|(i, seed)| {
            let mut record = ExerciseRecord::new(seed.name);
            record.id = format!("seed-{:04}", i + 1);
            record.visual_ref = Some(format!("visuals/{}.gif", repsage_core::slug(seed.name)));
            record.target_muscles = to_strings(seed.target);
            record.secondary_muscles = to_strings(seed.secondary);
            record.equipment = to_strings(seed.equipment);
            record.instructions = to_strings(seed.instructions);
            CatalogEntry {
                record,
                aliases: to_strings(seed.aliases),
            }
        })
        .collect()
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_ids_unique() {
        let entries = seed_entries();
        let mut ids: Vec<&str> = entries.iter().map(|e| e.record.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), entries.len());
    }

    #[test]
    fn test_seed_has_instructions_and_visuals() {
        for entry in seed_entries() {
            assert!(!entry.record.instructions.is_empty(), "{}", entry.record.name);
            assert!(entry.record.visual_ref.is_some(), "{}", entry.record.name);
        }
    }
}
