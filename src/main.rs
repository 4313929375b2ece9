//! Atom Chain entry point
//!
//! On the web this wires the DOM sink to a session and turns `Wake` requests
//! into animation frames and timeouts. Natively it plays a short scripted
//! game on the headless sink and logs how it went.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use atom_chain::platform::dom::{Dispatcher, DomSink};
    use atom_chain::{Action, BoardSettings, Session, Wake};

    type Game = Rc<RefCell<Session<DomSink>>>;

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Atom Chain starting...");

        let settings = BoardSettings::load();
        settings.save();

        let dispatcher: Dispatcher = Rc::new(RefCell::new(None));
        let sink = DomSink::new("gamearea", "players", dispatcher.clone())
            .expect("Failed to attach to the page");

        let seed = js_sys::Date::now() as u64;
        let game: Game = Rc::new(RefCell::new(Session::new(settings, seed, sink)));
        log::info!("Game initialized with seed: {}", seed);

        let weak = Rc::downgrade(&game);
        *dispatcher.borrow_mut() = Some(Box::new(move |action: Action| {
            if let Some(game) = weak.upgrade() {
                let wake = game.borrow_mut().handle(action);
                schedule(game, wake);
            }
        }));

        log::info!("Atom Chain running!");
    }

    fn schedule(game: Game, wake: Wake) {
        match wake {
            Wake::Frame => request_animation_frame(game),
            Wake::Delay(ms) => set_timeout(game, ms),
            Wake::Idle => {}
        }
    }

    fn request_animation_frame(game: Game) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            let wake = game.borrow_mut().on_frame();
            schedule(game, wake);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn set_timeout(game: Game, ms: u32) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move || {
            let wake = game.borrow_mut().on_delay();
            schedule(game, wake);
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            i32::try_from(ms).unwrap_or(i32::MAX),
        );
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Atom Chain (native) starting...");
    log::info!("Native mode has no board to click - run with `trunk serve` for the web version");

    demo_game();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Each player keeps charging their first atom, claiming a new one when they
/// have none, until a few cascades have run.
#[cfg(not(target_arch = "wasm32"))]
fn demo_game() {
    use atom_chain::platform::HeadlessSink;
    use atom_chain::{Action, BoardSettings, Session, Wake};

    let mut session = Session::new(BoardSettings::default(), 42, HeadlessSink::new(1280.0, 800.0));
    session.handle(Action::AddPlayer);

    let mut cascades = 0;
    for turn in 0..200 {
        let state = session.state();
        let Some(player) = state.current_player().map(|p| p.number) else {
            break;
        };
        let target = state
            .atoms
            .iter()
            .find(|a| a.owner == player)
            .or_else(|| state.atoms.iter().find(|a| a.is_unclaimed()))
            .map(|a| a.id);
        let Some(target) = target else {
            log::info!("Player {} has no move left after {} turns", player, turn);
            break;
        };

        let wake = session.handle(Action::Click(target));
        if wake != Wake::Idle {
            let merges = session.drain(wake);
            cascades += 1;
            log::info!(
                "Turn {}: player {} set off a cascade of {} steps",
                turn,
                player,
                merges
            );
        }
        if cascades >= 5 {
            break;
        }
    }

    let state = session.state();
    for player in &state.players {
        let owned = state.atoms.iter().filter(|a| a.owner == player.number).count();
        println!("{:>16} (player {}): {} atoms", player.name, player.number, owned);
    }
    println!(
        "{} cascades, {} protons on the board",
        cascades,
        state.total_protons()
    );
}
