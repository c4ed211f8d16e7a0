pub mod camera;
pub mod session;
pub mod snapshot;

use futures::lock::Mutex;

use camera::BrowserCamera;
use session::PunchSession;

/// The one kiosk this process serves, shared by every kiosk request.
pub type KioskHandle = Mutex<PunchSession<BrowserCamera>>;
