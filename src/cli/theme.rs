use clap::Subcommand;
use std::io::Write;

use crate::error::Result;
use crate::models::settings::Theme;
use crate::AppState;

#[derive(Subcommand, Debug, Clone)]
pub enum ThemeAction {
    /// Switch between dark and light.
    Toggle,
    /// Set the theme explicitly.
    Set { theme: Theme },
}

pub async fn run<W: Write>(state: &AppState, action: Option<ThemeAction>, out: &mut W) -> Result<()> {
    let prefs = &state.preferences_service;
    let theme = match action {
        None => prefs.theme().await?,
        Some(ThemeAction::Toggle) => prefs.toggle_theme().await?,
        Some(ThemeAction::Set { theme }) => {
            prefs.set_theme(theme).await?;
            theme
        }
    };
    writeln!(out, "Theme: {}", theme)?;
    Ok(())
}
