/// ControlLoop: the interactive menu.
///
/// Lists the clips, lets the user pick one by its 1-based index and edit
/// either its play odds or its volume (as a percentage), then rewrites the
/// settings file.  Anything it cannot make sense of is ignored.  Runs on a
/// blocking thread; the polling tasks pick up edits on a later tick.
use sfx_core::{Clip, ConfigStore};
use std::sync::Arc;
use tracing::{info, warn};

use crate::console::Console;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Quit,
    /// Zero-based clip index.
    Select(usize),
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldEdit {
    PlayOdds(u32),
    Volume(f32),
}

pub fn parse_menu_command(input: &str, clip_count: usize) -> MenuCommand {
    let input = input.trim();
    if input == "q" {
        return MenuCommand::Quit;
    }
    match input.parse::<usize>() {
        Ok(n) if (1..=clip_count).contains(&n) => MenuCommand::Select(n - 1),
        _ => MenuCommand::Ignore,
    }
}

/// Field `1` is play odds (integer >= 1), field `2` is volume as an integer
/// percentage.  The percentage is not clamped.
pub fn parse_field_edit(field: &str, value: &str) -> Option<FieldEdit> {
    match field.trim() {
        "1" => value
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|odds| *odds >= 1)
            .map(FieldEdit::PlayOdds),
        "2" => value
            .trim()
            .parse::<i32>()
            .ok()
            .map(|percent| FieldEdit::Volume(percent as f32 / 100.0)),
        _ => None,
    }
}

fn is_known_field(field: &str) -> bool {
    matches!(field.trim(), "1" | "2")
}

pub struct ControlLoop<C> {
    clips: Vec<Arc<Clip>>,
    store: ConfigStore,
    console: C,
}

impl<C: Console> ControlLoop<C> {
    pub fn new(clips: Vec<Arc<Clip>>, store: ConfigStore, console: C) -> Self {
        Self {
            clips,
            store,
            console,
        }
    }

    /// Runs until `q` or end of input.
    pub fn run(&mut self) {
        loop {
            self.show_clips();
            let Some(input) = self.console.read_line() else {
                info!("control: input closed");
                break;
            };

            match parse_menu_command(&input, self.clips.len()) {
                MenuCommand::Quit => break,
                MenuCommand::Select(idx) => {
                    self.edit_clip(idx);
                    self.persist();
                }
                MenuCommand::Ignore => {}
            }
        }
    }

    #[cfg(test)]
    pub fn console(&self) -> &C {
        &self.console
    }

    fn show_clips(&mut self) {
        self.console.clear();
        self.console.write_line("Found the following audio files in the directory:");
        for (i, clip) in self.clips.iter().enumerate() {
            self.console.write_line(&format!("{}. {}", i + 1, clip.name()));
        }
        self.console.write_line("q - quit");
    }

    fn edit_clip(&mut self, idx: usize) {
        let clip = Arc::clone(&self.clips[idx]);

        self.console.clear();
        self.console.write_line(clip.name());
        self.console.write_line(&format!("1. Odds - 1 : {}", clip.play_odds()));
        self.console.write_line(&format!("2. Volume - {:.0}%", clip.volume() * 100.0));

        let Some(field) = self.console.read_line() else {
            return;
        };
        if !is_known_field(&field) {
            return;
        }

        self.console.write_line("New value: ");
        let Some(value) = self.console.read_line() else {
            return;
        };

        match parse_field_edit(&field, &value) {
            Some(FieldEdit::PlayOdds(odds)) => {
                info!(
                    "control: {} play odds {} -> {}",
                    clip.name(),
                    clip.play_odds(),
                    odds
                );
                clip.set_play_odds(odds);
            }
            Some(FieldEdit::Volume(volume)) => {
                info!(
                    "control: {} volume {} -> {}",
                    clip.name(),
                    clip.volume(),
                    volume
                );
                clip.set_volume(volume);
            }
            None => {}
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.clips) {
            warn!("control: failed to save settings: {}", e);
            self.console.write_line(&format!("Could not save settings: {}", e));
        }
    }
}
