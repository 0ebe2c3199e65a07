//! Cleanup utility menu

use super::run_menu;
use crate::config::CleanupConfig;
use crate::console::Console;
use crate::error::Result;
use crate::services::CleanupService;
use std::io::{BufRead, Write};

pub const ENTRIES: [&str; 3] = ["Update file", "Print Contents of the file", "Exit"];

pub fn run<R: BufRead, W: Write>(config: &CleanupConfig, console: &mut Console<R, W>) -> Result<()> {
    run_menu(console, "Agata_Retail_Data_Clean Utility", &ENTRIES, |choice, console| {
        let name = console.read_line("Enter filename: ")?;
        match choice {
            0 => {
                CleanupService::update_file(config, &name)?;
                console.say(format!("File {} updated successfully", name.trim()))
            }
            _ => {
                let contents = CleanupService::read_file(config, &name)?;
                console.say(format!("Contents of the file {}", name.trim()))?;
                console.say("--------------------")?;
                for line in contents.lines() {
                    console.say(line)?;
                }
                Ok(())
            }
        }
    })
}
