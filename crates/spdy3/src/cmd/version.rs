use spdy3_frame::{DEFAULT_MAX_PAYLOAD, SPDY3};

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("spdy3 {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: spdy3");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("protocol_version: {SPDY3}");
    println!("max_payload_size: {DEFAULT_MAX_PAYLOAD}");
    println!(
        "target: {}",
        option_env!("SPDY3_BUILD_TARGET").unwrap_or("unknown")
    );
    println!(
        "profile: {}",
        option_env!("SPDY3_BUILD_PROFILE").unwrap_or("unknown")
    );
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));

    Ok(SUCCESS)
}
