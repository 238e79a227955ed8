//! Dashboard command implementation

use crate::cli::commands::appointment::summary_line;
use crate::cli::commands::common::{self, OutputFormat};
use crate::core::clinic::{offset_from_minutes, Clock, DashboardSummary, SystemClock};
use chrono::{FixedOffset, NaiveDate};
use clap::Args;

/// Arguments for the dashboard command
#[derive(Args, Debug)]
pub struct DashboardArgs {
    /// Show the day as seen at this offset from UTC instead of the clinic's
    #[arg(long, allow_negative_numbers = true)]
    pub utc_offset_minutes: Option<i32>,

    /// Show a specific day (YYYY-MM-DD)
    #[arg(long, conflicts_with = "utc_offset_minutes")]
    pub date: Option<NaiveDate>,
}

impl DashboardArgs {
    /// Execute the dashboard command
    pub async fn execute(&self, config_path: &str, format: OutputFormat) -> anyhow::Result<i32> {
        let (config, clinic) = match common::open(config_path).await {
            Ok(opened) => opened,
            Err(code) => return Ok(code),
        };

        let offset = match offset_from_minutes(
            self.utc_offset_minutes
                .unwrap_or(config.clinic.utc_offset_minutes),
        ) {
            Ok(offset) => offset,
            Err(e) => return Ok(common::report(&e)),
        };

        let date = match (self.date, self.utc_offset_minutes) {
            (Some(date), _) => date,
            (None, Some(minutes)) => match SystemClock::new(minutes) {
                Ok(clock) => clock.today(),
                Err(e) => return Ok(common::report(&e)),
            },
            (None, None) => clinic.today(),
        };

        tracing::debug!(%date, "Building dashboard");
        let result = clinic.dashboard_for(date).await;
        common::emit(result, format, |summary| print_summary(summary, offset))
    }
}

fn print_summary(summary: &DashboardSummary, offset: FixedOffset) {
    println!("📊 Front desk for {}", summary.date);
    println!();
    println!("  Patients:              {}", summary.total_patients);
    println!("  Doctors:               {}", summary.total_doctors);
    println!("  Upcoming appointments: {}", summary.upcoming_appointments);
    println!("  Unpaid payments:       {}", summary.unpaid_payments);
    println!();

    println!("Today's appointments:");
    if summary.todays_appointments.is_empty() {
        println!("  none");
    }
    for a in &summary.todays_appointments {
        println!("  {}", summary_line(a));
    }
    println!();

    println!("Recent unpaid payments:");
    if summary.recent_unpaid.is_empty() {
        println!("  none");
    }
    for p in &summary.recent_unpaid {
        println!(
            "  {:>5}  appointment {:>5}  {:>10}  recorded {}",
            p.id,
            p.appointment_id,
            p.amount,
            p.created_at.with_timezone(&offset).format("%Y-%m-%d %H:%M %:z")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_parse_negative_offset() {
        let cli = Cli::parse_from(["frontdesk", "dashboard", "--utc-offset-minutes", "-300"]);
        let Commands::Dashboard(args) = cli.command else {
            panic!("expected dashboard");
        };
        assert_eq!(args.utc_offset_minutes, Some(-300));
    }

    #[test]
    fn test_date_conflicts_with_offset() {
        let parsed = Cli::try_parse_from([
            "frontdesk",
            "dashboard",
            "--date",
            "2030-01-01",
            "--utc-offset-minutes",
            "60",
        ]);
        assert!(parsed.is_err());
    }
}
