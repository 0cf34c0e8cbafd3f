//! Terminal panels. Every function returns the text it would print.
use aotai_game::terrain::landmark_at_row;
use aotai_game::{
    Biome, GamePhase, ItemEffect, JourneySession, LogEntry, LogKind, Rejection, RunSummary,
    Stats, TerrainOracle, TileData, TileEvent,
};
use colored::{ColoredString, Colorize};
use std::fmt::Write as _;

const BAR_WIDTH: usize = 20;
const LOG_TAIL: usize = 6;

pub fn banner() -> String {
    format!(
        "{}\n{}",
        "⛰  Ao Tai Line: Crossing".bright_yellow().bold(),
        "================================".yellow()
    )
}

pub fn menu(death_count: u32) -> String {
    let mut out = banner();
    out.push('\n');
    out.push_str(
        "The Ao Tai Line runs along the spine of the Qinling, from Aoshan to Taibai.\n\
         It is one of the finest and deadliest ridge walks in China.\n\
         Ancient glaciers left behind the boulder fields of the Stone Sea, and the\n\
         weather up here changes without warning.\n\
         Spend your money wisely, plan your route, and watch your warmth and energy.\n",
    );
    let _ = writeln!(
        out,
        "{}",
        "Once hypothermia sets in, life slips away fast.".red().bold()
    );
    if death_count > 0 {
        let _ = writeln!(
            out,
            "{}",
            format!("Hikers lost on this ridge so far: {death_count}").dimmed()
        );
    }
    let _ = write!(out, "Type {} to visit the outfitter.", "start".bold());
    out
}

pub fn shop(session: &JourneySession) -> String {
    let state = session.state();
    let mut out = String::new();
    let _ = writeln!(out, "{}", "🎒 Outfitter".bright_cyan().bold());
    let _ = writeln!(out, "Money: {}", format!("¥{}", state.money).bright_yellow());
    for item in session.catalog().iter() {
        let owned = state.inventory.count(&item.id);
        let status: ColoredString = if item.is_gear() && owned > 0 {
            "owned".green()
        } else if item.price > state.money {
            "can't afford".red()
        } else {
            "".normal()
        };
        let _ = writeln!(
            out,
            "  {:<8} {:<22} ¥{:<5} {:<7} {:<24} x{owned} {status}",
            item.id,
            item.name,
            item.price,
            item.category.label(),
            effect_text(&item.effect),
        );
        let _ = writeln!(out, "           {}", item.description.dimmed());
    }
    let _ = write!(
        out,
        "Commands: {} | {}",
        "buy <id>".bold(),
        "done".bold()
    );
    out
}

fn effect_text(effect: &ItemEffect) -> String {
    effect.to_string()
}

pub fn play(session: &JourneySession) -> String {
    let state = session.state();
    let biome = session.current_tile().map(|tile| tile.biome);
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}  POS: {}  TURN: {}  BIOME: {}  ROW: {}/{}",
        "AO TAI LINE".bright_yellow(),
        state.position,
        state.turn,
        biome.map_or("unknown", Biome::label),
        state.position.y,
        session.config().goal_row()
    );
    if let Some(landmark) = landmark_at_row(state.position.y) {
        let _ = writeln!(
            out,
            "{} {}",
            landmark.name.bright_red().bold(),
            landmark.description.dimmed()
        );
    }
    out.push_str(&stats_panel(&state.stats));
    let weather = if state.weather.is_harsh() {
        state.weather.label().bright_red().bold()
    } else {
        state.weather.label().bright_white()
    };
    let _ = writeln!(out, "Weather: {weather}");

    let passives = session.passives();
    let _ = writeln!(
        out,
        "Gear: move efficiency +{}, warmth retention +{}",
        passives.move_efficiency, passives.warmth_retention
    );
    out.push_str(&inventory_panel(session));
    out.push_str(&viewport(session));
    for entry in state.log.tail(LOG_TAIL) {
        let _ = writeln!(out, "{}", log_entry(entry));
    }
    let _ = write!(out, "{}", "w/a/s/d move | rest | use <id> | help".dimmed());
    out
}

fn stats_panel(stats: &Stats) -> String {
    format!(
        "{}\n{}\n{}\n",
        stat_bar("Health", stats.health).red(),
        stat_bar("Energy", stats.energy).yellow(),
        stat_bar("Warmth", stats.warmth).cyan()
    )
}

fn stat_bar(label: &str, value: i32) -> String {
    let filled = usize::try_from(value.clamp(0, 100)).unwrap_or(0) * BAR_WIDTH / 100;
    format!(
        "{label:<7}[{}{}] {value:>3}",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled)
    )
}

fn inventory_panel(session: &JourneySession) -> String {
    let state = session.state();
    if state.inventory.is_empty() {
        return "Pack: empty\n".to_string();
    }
    let mut out = String::from("Pack:\n");
    for (id, count) in state.inventory.iter() {
        let Some(item) = session.catalog().find(id) else {
            continue;
        };
        if item.is_gear() {
            let _ = writeln!(out, "  [gear] {} ({})", item.name, item.effect);
        } else {
            let _ = writeln!(out, "  {} x{count}  (use {id})", item.name);
        }
    }
    out
}

pub const fn biome_glyph(biome: Biome) -> char {
    match biome {
        Biome::Forest => 'T',
        Biome::Meadow => '"',
        Biome::StoneSea => 'o',
        Biome::SnowRidge => '*',
        Biome::Peak => '^',
    }
}

fn cell(tile: Option<&TileData>, is_player: bool) -> ColoredString {
    if is_player {
        return "@".bright_yellow().bold();
    }
    let Some(tile) = tile else {
        return " ".normal();
    };
    if tile.blocked {
        return "#".dimmed();
    }
    if tile.event == Some(TileEvent::Landmark) {
        return "L".bright_red().bold();
    }
    let glyph = biome_glyph(tile.biome).to_string();
    match tile.biome {
        Biome::Forest => glyph.green(),
        Biome::Meadow => glyph.bright_green(),
        Biome::StoneSea => glyph.white(),
        Biome::SnowRidge => glyph.bright_cyan(),
        Biome::Peak => glyph.bright_yellow(),
    }
}

fn viewport(session: &JourneySession) -> String {
    let position = session.state().position;
    let window = session
        .terrain()
        .viewport(position, session.config().viewport_size);
    let mut out = String::new();
    for row in &window {
        out.push_str("  ");
        for tile in row {
            let is_player = tile.is_some_and(|t| t.x == position.x && t.y == position.y);
            let _ = write!(out, "{} ", cell(*tile, is_player));
        }
        out.push('\n');
    }
    out
}

pub fn log_entry(entry: &LogEntry) -> String {
    let text = entry.text.as_str();
    let styled = match entry.kind {
        LogKind::Info => text.normal(),
        LogKind::Danger => text.red(),
        LogKind::Success => text.green(),
        LogKind::Narrative => text.italic().bright_blue(),
    };
    format!("{} {styled}", format!("[{:>3}]", entry.turn).dimmed())
}

pub fn summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    if summary.won {
        let _ = writeln!(out, "{}", "🚩 CROSSING COMPLETE".bright_yellow().bold());
        let _ = writeln!(
            out,
            "Through sheer grit you crossed the Aoshan ridge and Ninth Heaven and now stand on \
             Taibai. The storm is behind you."
        );
    } else {
        let _ = writeln!(out, "{}", "☠  MISSING, PRESUMED LOST".red().bold());
        let _ = writeln!(out, "{}", "SIGNAL LOST...".red());
    }
    let _ = writeln!(out, "Reason:        {}", summary.reason);
    let _ = writeln!(out, "Turns:         {}", summary.turns);
    let _ = writeln!(
        out,
        "Ended in:      {} (row {})",
        summary.biome.map_or("unknown", Biome::label),
        summary.row
    );
    let _ = writeln!(out, "Energy left:   {}%", summary.energy_left);
    let _ = writeln!(out, "Score:         {}", summary.score.to_string().bold());
    if let Some(grade) = summary.grade {
        let _ = writeln!(out, "Grade:         {}", grade.to_string().bright_yellow().bold());
    }
    if !summary.won {
        let _ = writeln!(out, "Hikers lost:   {}", summary.attempt);
    }
    let _ = write!(out, "Type {} to try again.", "restart".bold());
    out
}

pub fn rejection(reason: Rejection) -> String {
    format!("{} {reason}", "✗".yellow())
}

pub fn help(phase: GamePhase) -> String {
    let commands = match phase {
        GamePhase::Menu => "start",
        GamePhase::Shop => "buy <id>, done",
        GamePhase::Playing => "w (climb), s (descend), a/d (sidestep), rest, use <id>",
        GamePhase::GameOver | GamePhase::Victory => "restart",
    };
    format!("Commands: {commands}, help, quit")
}

pub fn current_screen(session: &JourneySession) -> String {
    match session.state().phase {
        GamePhase::Menu => menu(session.death_count()),
        GamePhase::Shop => shop(session),
        GamePhase::Playing => play(session),
        GamePhase::GameOver | GamePhase::Victory => summary(&RunSummary::from_state(
            session.state(),
            session.terrain() as &dyn TerrainOracle,
            session.death_count(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aotai_game::{GameConfig, MemoryLedger, OfflineOracle};

    fn session() -> JourneySession {
        colored::control::set_override(false);
        JourneySession::with_seed(
            GameConfig {
                start_money: 500,
                ..GameConfig::default()
            },
            Box::new(OfflineOracle),
            Box::new(MemoryLedger::new(2)),
            3,
        )
        .unwrap()
    }

    #[test]
    fn stat_bars_scale_to_width() {
        assert_eq!(stat_bar("Warmth", 50), format!("Warmth [{}{}]  50", "#".repeat(10), "-".repeat(10)));
        assert_eq!(stat_bar("Health", 0), format!("Health [{}]   0", "-".repeat(20)));
    }

    #[test]
    fn shop_marks_owned_gear_and_prices() {
        let mut session = session();
        session.enter_shop();
        session.buy_item("poles");
        let text = shop(&session);
        assert!(text.contains("Money: ¥50"));
        assert!(text.contains("owned"));
        assert!(text.contains("can't afford"));
        assert!(text.contains("warmth retention +3"));
    }

    #[test]
    fn play_screen_shows_player_and_viewport() {
        let mut session = session();
        session.enter_shop();
        session.buy_item("mantou");
        session.start_journey();
        let text = play(&session);
        assert!(text.contains("TURN: 0"));
        assert!(text.contains('@'));
        assert!(text.contains("(use mantou)"));
        assert!(text.contains("The journey begins."));
        let map_rows = text.lines().filter(|line| line.starts_with("  ") && line.len() >= 18).count();
        assert!(map_rows >= 9);
    }

    #[test]
    fn menu_mentions_losses() {
        colored::control::set_override(false);
        assert!(menu(0).contains("start"));
        assert!(!menu(0).contains("lost on this ridge"));
        assert!(menu(3).contains("Hikers lost on this ridge so far: 3"));
    }
}
