use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::time::{sleep, Duration};

use crate::notifications::{card::CLOSE_CLASS, NotificationHandle, Presenter, Severity};
use crate::surface::{MemorySurface, Surface};

/// Toastlet - toast notifications rendered on a headless surface
#[derive(Parser)]
#[command(name = "toastlet")]
#[command(about = "Render toast notifications and watch them expire")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Presenter configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show a single notification and print the document until it expires
    Show(ShowArgs),

    /// Show one notification of each severity, close one early, and follow the rest
    Demo,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Message content (inserted according to the markup policy)
    pub message: String,

    /// Severity tag: success, error, warning, info or any custom tag
    #[arg(long, short, default_value = "success")]
    pub severity: String,

    /// Display time in milliseconds (defaults to the configured duration)
    #[arg(long)]
    pub duration_ms: Option<u64>,

    /// Click the close button after this many milliseconds
    #[arg(long)]
    pub close_after_ms: Option<u64>,
}

/// Command-line interface handler
pub struct CliHandler {
    presenter: Presenter<MemorySurface>,
}

impl CliHandler {
    pub fn new(presenter: Presenter<MemorySurface>) -> Self {
        Self { presenter }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Show(args) => self.handle_show(args).await,
            Commands::Demo => self.handle_demo().await,
        }
    }

    async fn handle_show(&self, args: ShowArgs) -> Result<()> {
        let handle = self.presenter.show(
            args.message,
            Severity::from(args.severity),
            args.duration_ms.map(Duration::from_millis),
        )?;
        self.print_snapshot("shown");

        if let Some(close_after) = args.close_after_ms {
            if close_after < handle.duration().as_millis() as u64 {
                sleep(Duration::from_millis(close_after)).await;
                println!("{}", progress_label(&handle));
                self.click_close(&handle)?;
                self.print_snapshot("closed");
            }
        }

        self.wait_until_expired(&handle).await;
        self.print_snapshot("expired");
        Ok(())
    }

    async fn handle_demo(&self) -> Result<()> {
        let short = Some(Duration::from_millis(1200));
        let success = self.presenter.success("Changes <strong>saved</strong>", short)?;
        self.presenter.error("Could not reach the server", None)?;
        let warning = self.presenter.warning("Session expires soon", short)?;
        self.presenter.info("3 new appointments", Some(Duration::from_millis(600)))?;
        let custom = self.presenter.show("Custom tag, info icon", "notice", short)?;
        self.print_snapshot("five notifications");

        sleep(Duration::from_millis(300)).await;
        println!("{}", progress_label(&warning));
        self.click_close(&warning)?;
        self.print_snapshot("warning closed by its button");

        sleep(Duration::from_millis(400)).await;
        self.print_snapshot("info expired");

        self.wait_until_expired(&success).await;
        self.wait_until_expired(&custom).await;
        self.print_snapshot("short notifications expired");

        let remaining = self.presenter.reset()?;
        println!("reset removed {} notification(s)", remaining);
        self.print_snapshot("after reset");
        Ok(())
    }

    fn click_close(&self, handle: &NotificationHandle) -> Result<bool> {
        let clicked = self.presenter.with_surface(|surface| {
            match surface.find_by_class(handle.node(), CLOSE_CLASS) {
                Some(close) => surface.click(close),
                None => Ok(false),
            }
        })?;
        Ok(clicked)
    }

    async fn wait_until_expired(&self, handle: &NotificationHandle) {
        let remaining = handle
            .expires_at()
            .saturating_duration_since(tokio::time::Instant::now());
        sleep(remaining + Duration::from_millis(10)).await;
    }

    fn print_snapshot(&self, label: &str) {
        let html = self.presenter.with_surface(|surface| surface.to_html());
        println!(
            "-- {} ({} visible)\n{}\n",
            label,
            self.presenter.visible_count(),
            html
        );
    }
}

/// Progress bar state of a notification, as a percentage of its display time left
fn progress_label(handle: &NotificationHandle) -> String {
    format!(
        "{} notification {}: {:.0}% of display time left",
        handle.severity(),
        handle.id(),
        handle.remaining_fraction() * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_show_command() {
        let cli = Cli::parse_from([
            "toastlet",
            "--debug",
            "show",
            "Saved",
            "--severity",
            "warning",
            "--duration-ms",
            "1000",
        ]);
        assert!(cli.debug);
        match cli.command {
            Some(Commands::Show(args)) => {
                assert_eq!(args.message, "Saved");
                assert_eq!(args.severity, "warning");
                assert_eq!(args.duration_ms, Some(1000));
                assert_eq!(args.close_after_ms, None);
            }
            _ => panic!("expected show command"),
        }
    }

    #[test]
    fn test_show_defaults_to_success() {
        let cli = Cli::parse_from(["toastlet", "show", "hi"]);
        match cli.command {
            Some(Commands::Show(args)) => assert_eq!(args.severity, "success"),
            _ => panic!("expected show command"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_label() {
        let presenter = Presenter::with_defaults(MemorySurface::new()).unwrap();
        let handle = presenter.warning("w", Some(Duration::from_millis(1000))).unwrap();

        sleep(Duration::from_millis(250)).await;
        let label = progress_label(&handle);
        assert!(label.starts_with("warning notification "));
        assert!(label.ends_with(": 75% of display time left"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_show_command_runs_to_expiry() {
        let presenter = Presenter::with_defaults(MemorySurface::new()).unwrap();
        let handler = CliHandler::new(presenter);
        let args = ShowArgs {
            message: "Saved".to_string(),
            severity: "success".to_string(),
            duration_ms: Some(200),
            close_after_ms: Some(50),
        };
        handler.handle_command(Commands::Show(args)).await.unwrap();
        assert_eq!(handler.presenter.visible_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_leaves_empty_container() {
        let presenter = Presenter::with_defaults(MemorySurface::new()).unwrap();
        let handler = CliHandler::new(presenter);
        handler.handle_command(Commands::Demo).await.unwrap();
        assert_eq!(handler.presenter.visible_count(), 0);
        assert_eq!(handler.presenter.pending_removals(), 0);
    }
}
