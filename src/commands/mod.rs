pub type CmdResult<T> = nodewright::Result<(T, i32)>;

pub mod new;
pub mod register;

/// Dispatch a command to its handler and map result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run_json($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (nodewright::Result<serde_json::Value>, i32) {
    crate::tty::status("nodewright is working...");

    match command {
        crate::Commands::New(args) => dispatch!(args, new),
        crate::Commands::Register(args) => dispatch!(args, register),
    }
}
