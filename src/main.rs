//! scentfleet main entrypoint.

use scentfleet::run;
use scentfleet::ui::messages::error;

fn main() {
    if let Err(e) = run() {
        error(format!("Error: {e}"));
        std::process::exit(1);
    }
}
