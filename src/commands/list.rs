//! List command implementation

use pjburn_core::metric;
use pjburn_core::platform::PlatformRegistry;
use pjburn_core::tables::{legal_image_types, legal_widths, BusWidth};

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{} MiB", bytes / (1024 * 1024))
    } else if bytes >= 1024 {
        format!("{} KiB", bytes / 1024)
    } else {
        format!("{} B", bytes)
    }
}

/// Print device sizes, widths, image types and known platforms
pub fn print_capabilities(registry: &PlatformRegistry) {
    println!("Device sizes (memory locations):");
    println!();
    println!("{:<6} {:>6} {:>12} {:>12}", "Size", "Code", "8 bit", "16 bit");
    println!("{}", "-".repeat(40));
    for size in metric::sorted_sizes() {
        println!(
            "{:<6} {:>6} {:>12} {:>12}",
            size.label,
            size.code,
            format_size(size.bytes(BusWidth::W8)),
            format_size(size.bytes(BusWidth::W16))
        );
    }

    println!();
    println!("Bus widths:  {} (1 = serial/SPI)", legal_widths());
    println!("Image types: {}", legal_image_types());

    println!();
    println!("Known platforms ({}):", registry.len());
    println!();
    println!("{:<26} {:>6} {:>5} {:>6}", "Name", "Width", "Swap", "Size");
    println!("{}", "-".repeat(46));
    for platform in registry.platforms() {
        println!(
            "{:<26} {:>6} {:>5} {:>6}",
            platform.name,
            platform.width,
            if platform.swap { "yes" } else { "-" },
            platform.size.map(|s| s.label).unwrap_or("auto")
        );
    }
}
