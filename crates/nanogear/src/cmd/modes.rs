use nanogear_hub::LightArea;

use crate::cmd::ModesArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_modes, OutputFormat};

pub fn run(args: ModesArgs, format: OutputFormat) -> CliResult<i32> {
    let areas = match args.area {
        Some(area) => vec![LightArea::from(area)],
        None => vec![LightArea::Main, LightArea::Side],
    };
    print_modes(&areas, format);
    Ok(SUCCESS)
}
