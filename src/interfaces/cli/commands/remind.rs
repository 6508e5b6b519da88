//! Foreground reminder loop

use std::time::Duration;

use colored::Colorize;
use tokio::sync::broadcast::error::RecvError;

use super::helpers::{info_line, warn_line};
use crate::interfaces::cli::CliError;
use crate::services::{AppServices, NotificationItem, NotificationPermission, ReminderKind, Toast, ToastLevel};

fn print_item(item: &NotificationItem, level: ToastLevel) {
    let title = match level {
        ToastLevel::Info => item.title.blue().bold(),
        ToastLevel::Success => item.title.green().bold(),
        ToastLevel::Default => item.title.bold(),
    };
    println!(
        "{} {} {}",
        item.timestamp
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
            .to_string()
            .dimmed(),
        title,
        format!("[{}]", item.kind.as_ref()).dimmed()
    );
    println!("  {}", item.message);
}

fn print_toast(toast: &Toast) {
    print_item(&toast.item, toast.level);
}

pub async fn run_reminders(services: &AppServices, once: bool, desktop: bool) -> Result<(), CliError> {
    if desktop {
        match services.notifications.request_permission() {
            NotificationPermission::Granted => info_line("Desktop notifications enabled"),
            other => warn_line(&format!("Desktop notifications unavailable ({:?})", other)),
        }
    }

    if once {
        for (i, kind) in [ReminderKind::Adkar, ReminderKind::Quran].into_iter().enumerate() {
            if i > 0 {
                let delay = services.reminders.status().follow_up_secs;
                tokio::time::sleep(Duration::from_secs(delay)).await;
            }
            let Some(item) = services.reminders.trigger(kind) else {
                return Err(CliError::CommandError(format!(
                    "No {} content bundled",
                    kind.as_ref()
                )));
            };
            let level = item.kind.toast_level();
            print_item(&item, level);
        }
        return Ok(());
    }

    let mut toasts = services.notifications.subscribe();
    services.reminders.start();
    services.alerts.start();

    let status = services.reminders.status();
    info_line(&format!(
        "Reminders every {} min (first in {}s). Press Ctrl+C to stop.",
        status.interval_minutes, status.warmup_secs
    ));

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            received = toasts.recv() => match received {
                Ok(toast) => print_toast(&toast),
                Err(RecvError::Lagged(skipped)) => {
                    warn_line(&format!("{} notifications were skipped", skipped));
                }
                Err(RecvError::Closed) => break,
            },
            _ = &mut ctrl_c => {
                println!();
                break;
            }
        }
    }

    services.shutdown();
    info_line("Reminders stopped");
    Ok(())
}
