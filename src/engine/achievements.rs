#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Achievement {
    pub id: &'static str,
    pub title: String,
    pub description: String,
    pub icon: &'static str,
}

struct AchievementDefinition {
    table: u32,
    id: &'static str,
    title: &'static str,
    icon: &'static str,
}

// `{name}` is replaced with the child's name.
const ACHIEVEMENTS: &[AchievementDefinition] = &[
    AchievementDefinition {
        table: 1,
        id: "tabla1",
        title: "Hada {name} del 1",
        icon: "🌸",
    },
    AchievementDefinition {
        table: 2,
        id: "tabla2",
        title: "{name}, Estrella del 2",
        icon: "⭐",
    },
    AchievementDefinition {
        table: 3,
        id: "tabla3",
        title: "{name}, Reina del 3",
        icon: "👑",
    },
    AchievementDefinition {
        table: 4,
        id: "tabla4",
        title: "Maga {name} del 4",
        icon: "🪄",
    },
    AchievementDefinition {
        table: 5,
        id: "tabla5",
        title: "{name}, Princesa del 5",
        icon: "🎀",
    },
];

pub fn achievement_for(table: u32, child_name: &str) -> Option<Achievement> {
    ACHIEVEMENTS
        .iter()
        .find(|def| def.table == table)
        .map(|def| Achievement {
            id: def.id,
            title: def.title.replace("{name}", child_name),
            description: format!("¡Dominaste la tabla del {table}!"),
            icon: def.icon,
        })
}
