// ============================================================================
// Log Output Functions
// ============================================================================

use time::OffsetDateTime;
use crate::dashboard::config::Config;
use crate::loader::Snapshot;
use crate::utils::format;

pub fn log_startup_banner(config: &Config) {
    println!("====================================");
    println!("  Bot Dashboard Poller Starting");
    println!("====================================");
    println!("Data source: {}", config.loader.base_url);
    println!("Resources: {}", config.loader.resources.join(", "));
    println!("Agents: {}", config.loader.agents.join(", "));
    println!("Refresh interval: {}s", config.loader.refresh_interval_secs);
    match config.http.port {
        Some(port) => println!("HTTP API: http://{}:{}", config.http.bind, port),
        None => println!("HTTP API: disabled"),
    }
    println!("------------------------------------");
}

pub fn log_snapshot_report(snapshot: &Snapshot) {
    let now = OffsetDateTime::now_utc();

    println!("\n╔══════════════════════════════════════════════════════════════════════╗");
    println!("║                        DASHBOARD SNAPSHOT                            ║");
    println!("╚══════════════════════════════════════════════════════════════════════╝");
    println!(
        "Loaded {}/{} at {}",
        snapshot.loaded_count(),
        snapshot.total_count(),
        format::timestamp(now)
    );

    // Resources
    let names: Vec<&str> = snapshot.resource_names().collect();
    println!("\n📦 Resources");
    for (idx, name) in names.iter().enumerate() {
        let prefix = if idx == names.len() - 1 { "└─" } else { "├─" };
        match snapshot.failures().get(*name) {
            Some(reason) => println!("   {} ❌ {} ({})", prefix, name, reason),
            None => println!("   {} ✅ {}", prefix, name),
        }
    }

    // Bot status
    match snapshot.status() {
        Ok(Some(status)) => {
            let state = if status.is_online() { "🟢 Online" } else { "🔴 Offline" };
            println!("\n🤖 Status: {}", state);
            println!("   ├─ Model:    {}", status.model.as_deref().unwrap_or("--"));
            println!("   ├─ Tokens:   {}", format::number(status.tokens_today));
            println!("   ├─ Cost:     {}", format::currency(status.cost_today));
            println!("   └─ Sessions: {}", status.active_sessions);
        }
        Ok(None) => println!("\n🤖 Status: no data"),
        Err(e) => println!("\n🤖 Status: ⚠️  unreadable ({})", e),
    }

    // Cron jobs
    match snapshot.cron() {
        Ok(Some(cron)) => {
            let counts = cron.counts();
            println!(
                "\n⏰ Cron: ✅ {} enabled, ⏸️ {} disabled, 🏃 {} running",
                counts.enabled, counts.disabled, counts.running
            );
        }
        Ok(None) => println!("\n⏰ Cron: no data"),
        Err(e) => println!("\n⏰ Cron: ⚠️  unreadable ({})", e),
    }

    // Agents
    let ids: Vec<&str> = snapshot.agent_ids().collect();
    if !ids.is_empty() {
        println!("\n👥 Agents: {} total", ids.len());
    }
    for (idx, id) in ids.iter().enumerate() {
        let is_last = idx == ids.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let continuation = if is_last { " " } else { "│" };

        match snapshot.agent_stats(id) {
            Ok(Some(agent)) => {
                let icon = if agent.is_active() { "🟢" } else { "🟡" };
                println!("   {} {} {} ({})", prefix, icon, id, agent.model.as_deref().unwrap_or("--"));
                println!(
                    "   {}    ├─ Tokens: {}, Cost: {}",
                    continuation,
                    format::number(agent.tokens_today),
                    format::currency(agent.cost_today)
                );
                let last_seen = agent
                    .sessions
                    .iter()
                    .filter_map(|s| s.last_active.as_deref().and_then(format::parse_timestamp))
                    .max()
                    .map(|at| format::relative_time(at, now))
                    .unwrap_or_else(|| "--".to_string());
                println!(
                    "   {}    └─ Sessions: {} (last active {})",
                    continuation,
                    agent.session_total(),
                    last_seen
                );
            }
            Ok(None) => println!("   {} ⚪ {} (no data)", prefix, id),
            Err(e) => println!("   {} ⚠️  {} unreadable ({})", prefix, id, e),
        }
    }

    println!();
}
