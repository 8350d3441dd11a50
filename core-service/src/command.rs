//! Player controls as messages.
//!
//! Host callbacks (buttons on the player element, resize listeners) are
//! synchronous; they send a [`PlayerCommand`] through a [`PlayerHandle`] and
//! the service run loop executes it.

use bridge_traits::page::ControlAction;
use futures::channel::mpsc::UnboundedSender;

use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    Play,
    Pause,
    TogglePlayPause,
    Next,
    Previous,
    /// Playlist click, 0-based.
    SelectTrack(usize),
    /// Seek to a fraction of the track.
    Seek(f64),
    /// Click on the progress area at `offset_x` of `width` pixels.
    SeekClick { offset_x: f64, width: f64 },
    SetVolume(i32),
    SetPitch(i32),
    AdjustPitch(i32),
    AddToCart,
    /// Load a product by id, e.g. from a host script.
    Load {
        product_id: String,
        track_index: Option<usize>,
        autoplay: bool,
    },
    /// Page content changed; bind new triggers.
    Rescan,
    /// Viewport resized or rotated.
    ViewportChanged,
    /// Stop the run loop.
    Shutdown,
}

impl From<ControlAction> for PlayerCommand {
    fn from(action: ControlAction) -> Self {
        match action {
            ControlAction::TogglePlayPause => PlayerCommand::TogglePlayPause,
            ControlAction::Next => PlayerCommand::Next,
            ControlAction::Previous => PlayerCommand::Previous,
            ControlAction::SelectTrack(index) => PlayerCommand::SelectTrack(index),
            ControlAction::SeekClick { offset_x, width } => {
                PlayerCommand::SeekClick { offset_x, width }
            }
            ControlAction::SetVolume(percent) => PlayerCommand::SetVolume(percent),
            ControlAction::AdjustPitch(delta) => PlayerCommand::AdjustPitch(delta),
            ControlAction::ResetPitch => PlayerCommand::SetPitch(0),
            ControlAction::AddToCart => PlayerCommand::AddToCart,
        }
    }
}

/// Cloneable sender for [`PlayerCommand`]s.
#[derive(Clone, Debug)]
pub struct PlayerHandle {
    commands: UnboundedSender<PlayerCommand>,
}

impl PlayerHandle {
    pub(crate) fn new(commands: UnboundedSender<PlayerCommand>) -> Self {
        Self { commands }
    }

    /// Queue `command`.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Stopped`] once the run loop has ended.
    pub fn send(&self, command: PlayerCommand) -> Result<()> {
        self.commands
            .unbounded_send(command)
            .map_err(|_| ServiceError::Stopped)
    }

    pub fn play(&self) -> Result<()> {
        self.send(PlayerCommand::Play)
    }

    pub fn pause(&self) -> Result<()> {
        self.send(PlayerCommand::Pause)
    }

    pub fn toggle(&self) -> Result<()> {
        self.send(PlayerCommand::TogglePlayPause)
    }

    pub fn next(&self) -> Result<()> {
        self.send(PlayerCommand::Next)
    }

    pub fn previous(&self) -> Result<()> {
        self.send(PlayerCommand::Previous)
    }

    pub fn shutdown(&self) -> Result<()> {
        self.send(PlayerCommand::Shutdown)
    }
}
