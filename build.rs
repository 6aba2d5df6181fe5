use std::env;

fn main() {
    // Wall-clock anchor provisioning (optional). When set, the firmware
    // anchors its clock to this Unix timestamp at boot; when absent the
    // anchor defaults to 0 and timestamps count from the 1970 epoch until a
    // provisioned build is flashed.
    if let Ok(anchor) = env::var("METER_CLOCK_ANCHOR") {
        println!("cargo:rustc-env=METER_CLOCK_ANCHOR={}", anchor);
        println!(
            "cargo:warning=Using METER_CLOCK_ANCHOR from environment: {}",
            anchor
        );
    } else {
        println!("cargo:rustc-env=METER_CLOCK_ANCHOR=0");
    }

    println!("cargo:rerun-if-env-changed=METER_CLOCK_ANCHOR");
}
