//! Admin command dispatch.
//!
//! One string in, one `CommandResponse` out. Unknown commands are denied,
//! not errored; only a store failure bubbles up as an error.

use crate::store::Store;
use anyhow::Result;
use shared::{CommandResponse, EFFECT_GOD_MODE, EFFECT_RAINBOW};
use tracing::info;

pub fn dispatch(store: &Store, cmd: &str) -> Result<CommandResponse> {
    let cmd = cmd.trim();
    if cmd.starts_with("PURGE") {
        return purge(store, cmd);
    }

    match cmd {
        "RESET_SYSTEM_DATA" => {
            store.reset_all()?;
            // Appended after the wipe commits, so it is the one surviving entry.
            store.append_log("ALERT", "System Factory Reset Executed.")?;
            info!("full system reset executed");
            Ok(granted("SYSTEM DATA WIPED CLEAN.", None))
        }
        "SUDO_ROOT" => {
            store.append_log("SUCCESS", "Admin entered God Mode.")?;
            Ok(granted(
                "Access Granted: Root Privileges",
                Some(EFFECT_GOD_MODE),
            ))
        }
        "COLOR_HACK" => Ok(granted("Display Driver Overridden", Some(EFFECT_RAINBOW))),
        _ => Ok(denied("Access Denied")),
    }
}

fn purge(store: &Store, cmd: &str) -> Result<CommandResponse> {
    // Target is the first space-separated token after PURGE; a doubled
    // space therefore yields an empty target. Multi-word names are not
    // addressable.
    let target = cmd.split(' ').nth(1).unwrap_or("");
    if target.is_empty() {
        return Ok(denied("Name missing"));
    }

    if store.purge_student(target)? {
        store.append_log("ALERT", &format!("Target [{target}] eliminated by Admin."))?;
        info!(name = %target, "student purged");
        Ok(granted(&format!("TARGET [{target}] DELETED."), None))
    } else {
        Ok(denied(&format!("User [{target}] not found.")))
    }
}

fn granted(msg: &str, effect: Option<&str>) -> CommandResponse {
    CommandResponse {
        success: true,
        msg: msg.to_string(),
        effect: effect.map(str::to_string),
    }
}

fn denied(msg: &str) -> CommandResponse {
    CommandResponse {
        success: false,
        msg: msg.to_string(),
        effect: None,
    }
}
