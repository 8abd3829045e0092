use crate::{
    catalog::CharacterCatalog,
    model::{Part, PartTags, SampleCombo},
};

pub const DEMO_CHARACTER: &str = "ryu";

struct DemoPart {
    id: &'static str,
    name: &'static str,
    notation: &'static str,
    url: &'static str,
    window: (f64, Option<f64>),
    damage: i32,
    frames: (Option<i32>, Option<i32>),
    kind: &'static str,
    start_condition: &'static str,
    conditions: &'static [&'static str],
    drive_gauge: &'static str,
    sa_gauge: &'static str,
}

const DEMO_PARTS: &[DemoPart] = &[
    DemoPart {
        id: "ryu-001",
        name: "Light confirm",
        notation: "2LP > 2LP > 5LK xx Light Tatsu",
        url: "media/ryu/light-confirm.mp4",
        window: (0.4, Some(2.6)),
        damage: 1_270,
        frames: (None, Some(19)),
        kind: "starter",
        start_condition: "neutral",
        conditions: &["midscreen"],
        drive_gauge: "0",
        sa_gauge: "0",
    },
    DemoPart {
        id: "ryu-002",
        name: "Drive Rush link",
        notation: "5MP > DR 5MP > 5HP",
        url: "https://www.youtube.com/watch?v=Zr7uRyuDR02",
        window: (1.0, Some(4.2)),
        damage: 2_110,
        frames: (Some(19), Some(2)),
        kind: "extender",
        start_condition: "knockdown",
        conditions: &["midscreen", "corner"],
        drive_gauge: "3",
        sa_gauge: "0",
    },
    DemoPart {
        id: "ryu-003",
        name: "Denjin charge",
        notation: "2HP xx Denjin Hadoken (charged)",
        url: "media/ryu/denjin-charge.mp4",
        window: (0.0, Some(3.1)),
        damage: 1_500,
        frames: (Some(2), Some(31)),
        kind: "extender",
        start_condition: "combo",
        conditions: &["corner"],
        drive_gauge: "0",
        sa_gauge: "0",
    },
    DemoPart {
        id: "ryu-004",
        name: "OD Tatsu carry",
        notation: "OD Tatsu > Jumping HK > 2MK",
        url: "https://youtu.be/Ryu0DTatsu4",
        window: (0.5, None),
        damage: 1_820,
        frames: (Some(31), Some(-2)),
        kind: "extender",
        start_condition: "juggle",
        conditions: &["midscreen"],
        drive_gauge: "2",
        sa_gauge: "0",
    },
    DemoPart {
        id: "ryu-005",
        name: "Level 3 ender",
        notation: "Heavy Shoryuken xx Shin Hashogeki",
        url: "media/ryu/level-three.mp4",
        window: (0.2, Some(6.8)),
        damage: 4_000,
        frames: (Some(-2), None),
        kind: "ender",
        start_condition: "juggle",
        conditions: &["corner", "punish counter"],
        drive_gauge: "0",
        sa_gauge: "3",
    },
];

/// Small deterministic catalog used by the CLI demo and the test suites.
#[must_use]
pub fn demo_catalog() -> CharacterCatalog {
    let parts = DEMO_PARTS
        .iter()
        .enumerate()
        .map(|(index, demo)| {
            let mut part = Part::new(demo.id, DEMO_CHARACTER, demo.notation, demo.url)
                .with_window(demo.window.0, demo.window.1);
            part.name = demo.name.to_string();
            part.order = i64::try_from(index).unwrap_or(i64::MAX) * 10;
            part.damage = Some(demo.damage);
            part.start_frame_advantage = demo.frames.0;
            part.end_frame_advantage = demo.frames.1;
            part.tags = PartTags {
                kind: Some(demo.kind.to_string()),
                start_condition: Some(demo.start_condition.to_string()),
                conditions: demo.conditions.iter().map(ToString::to_string).collect(),
                drive_gauge: Some(demo.drive_gauge.to_string()),
                sa_gauge: Some(demo.sa_gauge.to_string()),
            };
            part
        })
        .collect();

    let samples = vec![
        SampleCombo {
            name: "Corner bread and butter".to_string(),
            part_ids: ["ryu-001", "ryu-002", "ryu-003"]
                .map(String::from)
                .to_vec(),
        },
        SampleCombo {
            name: "Max damage".to_string(),
            part_ids: ["ryu-002", "ryu-004", "ryu-005"]
                .map(String::from)
                .to_vec(),
        },
    ];

    CharacterCatalog::new(DEMO_CHARACTER, parts, samples)
        .expect("fixture catalog should be valid")
}
