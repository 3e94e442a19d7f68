use crate::commands::{current_thread_runtime, load_config, CommandResult};
use sitequote_db::{connect, migrations};

pub fn run() -> CommandResult {
    let config = match load_config("migrate") {
        Ok(config) => config,
        Err(failure) => return failure,
    };

    let runtime = match current_thread_runtime("migrate") {
        Ok(runtime) => runtime,
        Err(failure) => return failure,
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;
        Ok::<(), (&'static str, String, u8)>(())
    });

    match result {
        Ok(()) => CommandResult::success("migrate", "applied pending migrations"),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("migrate", error_class, message, exit_code)
        }
    }
}
