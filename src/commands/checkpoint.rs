//! Checkpoint commands:
//! - `nbdrive checkpoint create PATH`
//! - `nbdrive checkpoint list PATH [--all]`
//! - `nbdrive checkpoint restore PATH [--id ID]`
//! - `nbdrive checkpoint delete PATH [--id ID | --all]`

use anyhow::Result;

use nbdrive::Drive;

use super::print_json;
use crate::CheckpointAction;

/// Execute checkpoint command.
pub fn execute(drive: &Drive, action: CheckpointAction) -> Result<()> {
    let checkpoints = drive.checkpoints();

    match action {
        CheckpointAction::Create { path } => {
            let record = drive.create_checkpoint(&path)?;
            print_json(&record)
        },
        CheckpointAction::List { path, all } => {
            let records = if all {
                checkpoints.list_all(&path)?
            } else {
                checkpoints.list(&path)?
            };
            print_json(&records)
        },
        CheckpointAction::Restore { path, id } => {
            let id = id.unwrap_or_else(|| checkpoints.checkpoint_id().to_string());
            let model = drive.restore_checkpoint(&id, &path)?;
            print_json(&model)
        },
        CheckpointAction::Delete { path, id, all } => {
            if all {
                checkpoints.delete_all(&path)?;
            } else {
                let id = id.unwrap_or_else(|| checkpoints.checkpoint_id().to_string());
                checkpoints.delete_one(&id, &path)?;
            }
            tracing::info!(path = %path, "Deleted checkpoints");
            Ok(())
        },
    }
}
