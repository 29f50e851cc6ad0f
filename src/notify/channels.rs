use std::io::Write;

use enum_dispatch::enum_dispatch;
use log::info;

use super::{Delivery, Notifier, NotifyError};

#[enum_dispatch(Notifier)]
pub enum Channel {
    ConsoleNotifier,
    LogNotifier,
}

/// Prints the message to standard output.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn name(&self) -> &'static str {
        "console"
    }

    fn deliver(&self, delivery: &Delivery) -> Result<(), NotifyError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout)?;
        write!(stdout, "{}", delivery.transcript)?;
        writeln!(stdout)?;
        stdout.flush()?;

        Ok(())
    }
}

/// Emits the message through the logger, one record per line.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    fn deliver(&self, delivery: &Delivery) -> Result<(), NotifyError> {
        for line in delivery.transcript.lines() {
            info!("{}", line);
        }

        Ok(())
    }
}
