use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use crate::application::{AppError, AppResult, DesktopNotifier};
use crate::domain::StockAlert;

/// A notifier tool that has not exited by then is killed.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Native desktop notification through the platform's command-line tool.
pub struct OsDesktopNotifier;

impl OsDesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OsDesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DesktopNotifier for OsDesktopNotifier {
    async fn alert(&self, alert: &StockAlert) -> AppResult<()> {
        let Some(mut cmd) = platform_command(alert) else {
            tracing::debug!(os = std::env::consts::OS, "desktop alerts not supported here");
            return Ok(());
        };

        cmd.kill_on_drop(true);
        let status = tokio::time::timeout(COMMAND_TIMEOUT, cmd.status())
            .await
            .map_err(|_| AppError::Desktop(format!("notifier did not exit within {COMMAND_TIMEOUT:?}")))?
            .map_err(|e| AppError::Desktop(e.to_string()))?;
        if !status.success() {
            return Err(AppError::Desktop(format!("notifier exited with {status}")));
        }
        Ok(())
    }
}

fn alert_text(alert: &StockAlert) -> String {
    format!("Has {} Stock", alert.match_count)
}

#[cfg(target_os = "macos")]
fn platform_command(alert: &StockAlert) -> Option<Command> {
    let script = format!(
        "display notification {} sound name \"Hero\" with title {}",
        applescript_quote(&alert_text(alert)),
        applescript_quote(&alert.target_name)
    );
    let mut cmd = Command::new("osascript");
    cmd.arg("-e").arg(script);
    Some(cmd)
}

#[cfg(target_os = "linux")]
fn platform_command(alert: &StockAlert) -> Option<Command> {
    let mut cmd = Command::new("notify-send");
    cmd.arg(&alert.target_name).arg(alert_text(alert));
    Some(cmd)
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn platform_command(_alert: &StockAlert) -> Option<Command> {
    None
}

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn applescript_quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}
