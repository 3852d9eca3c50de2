use nanogear_hub::build_command;

use crate::cmd::EncodeArgs;
use crate::exit::{validation_error, CliResult, SUCCESS};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let request = args.light.to_request()?;
    let encoded =
        build_command(&request).map_err(|err| validation_error("invalid command", err))?;
    print_encoded(&request, &encoded, format);
    Ok(SUCCESS)
}
