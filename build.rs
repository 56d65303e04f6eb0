//! Build script for the USB-core firmware
//!
//! Handles:
//! - Shared region and D3 SRAM placement (`shared.x`) generated from `src/layout.rs`
//! - Linker scripts for the embedded binary

use std::env;
use std::fs;
use std::path::PathBuf;

#[allow(dead_code)]
#[path = "src/layout.rs"]
mod layout;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/layout.rs");

    let out_dir = PathBuf::from(env::var("OUT_DIR").expect("OUT_DIR is set by cargo"));

    let script = format!(
        "MEMORY\n{{\n  SHARED_RAM : ORIGIN = {:#010X}, LENGTH = {:#X}\n  RAM_D3 : ORIGIN = {:#010X}, LENGTH = {:#X}\n}}\n\n\
         SECTIONS\n{{\n  .shared_ram (NOLOAD) : ALIGN(32)\n  {{\n    KEEP(*(.shared_ram .shared_ram.*));\n  }} > SHARED_RAM\n\n\
         .ram_d3 (NOLOAD) : ALIGN(8)\n  {{\n    *(.ram_d3 .ram_d3.*);\n  }} > RAM_D3\n}}\nINSERT AFTER .bss;\n",
        layout::BULK_BUFFER_ADDR,
        layout::SHARED_REGION_SIZE,
        layout::RAM_D3_ADDR,
        layout::RAM_D3_SIZE,
    );
    fs::write(out_dir.join("shared.x"), script).expect("write shared.x");
    println!("cargo:rustc-link-search={}", out_dir.display());

    // memory.x comes from embassy-stm32's `memory-x` feature
    if env::var_os("CARGO_FEATURE_EMBEDDED").is_some() {
        println!("cargo:rustc-link-arg-bins=--nmagic");
        println!("cargo:rustc-link-arg-bins=-Tlink.x");
        println!("cargo:rustc-link-arg-bins=-Tshared.x");
        println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    }
}
