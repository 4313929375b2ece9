//! Browser render sink backed by plain DOM elements
//!
//! Atoms and particles are absolutely positioned `<img>` elements inside a
//! stage `<div>`; styling lives in the page's CSS (`atom`, `particle`, `plN`).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, HtmlImageElement};

use super::{RenderSink, Visual};
use crate::session::Action;
use crate::sim::{Atom, AtomId, Bounds, Player, PlayerNumber, UNCLAIMED};

/// Slot the page fills with the function that feeds actions into the session
///
/// Handlers read it when they fire, so the sink can be built before the
/// session that will own it.
pub type Dispatcher = Rc<RefCell<Option<Box<dyn Fn(Action)>>>>;

fn owner_class(base: &str, owner: PlayerNumber) -> String {
    if owner == UNCLAIMED {
        base.to_string()
    } else {
        format!("{} pl{}", base, owner)
    }
}

fn log_err(what: &str, result: Result<(), JsValue>) {
    if let Err(e) = result {
        log::warn!("DOM {} failed: {:?}", what, e);
    }
}

fn set_position(el: &HtmlElement, pos: Vec2) -> Result<(), JsValue> {
    let style = el.style();
    style.set_property("left", &format!("{}px", pos.x.floor()))?;
    style.set_property("top", &format!("{}px", pos.y.floor()))
}

fn dispatch_handler(dispatcher: &Dispatcher, action: Action) -> Closure<dyn FnMut()> {
    let dispatcher = dispatcher.clone();
    Closure::<dyn FnMut()>::new(move || {
        if let Some(dispatch) = dispatcher.borrow().as_ref() {
            dispatch(action);
        }
    })
}

pub struct DomSink {
    document: Document,
    area: HtmlElement,
    roster: Element,
    stage: Element,
    elements: HashMap<Visual, HtmlElement>,
    /// Click handlers live as long as the sink; rebinding only swaps `onclick`
    click_handlers: HashMap<AtomId, Closure<dyn FnMut()>>,
    add_handler: Closure<dyn FnMut()>,
    dispatcher: Dispatcher,
}

impl DomSink {
    /// Attach to the board element `area_id` and the player panel `roster_id`
    pub fn new(area_id: &str, roster_id: &str, dispatcher: Dispatcher) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let area: HtmlElement = document
            .get_element_by_id(area_id)
            .ok_or_else(|| JsValue::from_str("no game area"))?
            .dyn_into()?;
        let roster = document
            .get_element_by_id(roster_id)
            .ok_or_else(|| JsValue::from_str("no player panel"))?;
        let stage = document.create_element("div")?;
        let add_handler = dispatch_handler(&dispatcher, Action::AddPlayer);

        Ok(Self {
            document,
            area,
            roster,
            stage,
            elements: HashMap::new(),
            click_handlers: HashMap::new(),
            add_handler,
            dispatcher,
        })
    }

    fn image(&self, id: &str) -> Result<HtmlElement, JsValue> {
        let img: HtmlImageElement = self.document.create_element("img")?.dyn_into()?;
        img.set_id(id);
        Ok(img.unchecked_into())
    }

    fn try_create(&mut self, visual: Visual, owner: PlayerNumber, pos: Vec2) -> Result<(), JsValue> {
        let el = match visual {
            Visual::Atom(id) => {
                let el = self.image(&format!("atom-{}", id))?;
                el.set_class_name(&owner_class("atom", owner));
                el
            }
            Visual::Particle(i) => {
                let el = self.image(&format!("particle-{}", i))?;
                el.set_class_name(&owner_class("particle", owner));
                el.unchecked_ref::<HtmlImageElement>()
                    .set_src("img/particle.png");
                self.stage.append_child(&el)?;
                el
            }
        };
        set_position(&el, pos)?;
        self.elements.insert(visual, el);
        Ok(())
    }

    fn try_replace_stage(&mut self, visuals: &[Visual]) -> Result<(), JsValue> {
        let stage = self.document.create_element("div")?;
        for visual in visuals {
            if let Some(el) = self.elements.get(visual) {
                stage.append_child(el)?;
            }
        }
        while let Some(child) = self.area.first_child() {
            self.area.remove_child(&child)?;
        }
        self.area.append_child(&stage)?;
        self.stage = stage;
        self.elements.retain(|v, _| visuals.contains(v));
        Ok(())
    }

    fn try_render_players(&mut self, players: &[Player], can_add: bool) -> Result<(), JsValue> {
        while let Some(child) = self.roster.first_child() {
            self.roster.remove_child(&child)?;
        }
        for (i, player) in players.iter().enumerate() {
            let row = self.document.create_element("div")?;
            let class = owner_class("player", player.number);
            row.set_class_name(&if i == 0 { class + " current" } else { class });
            row.set_text_content(Some(&player.name));
            self.roster.append_child(&row)?;
        }
        if can_add {
            let button: HtmlElement = self.document.create_element("button")?.dyn_into()?;
            button.set_class_name("add-player");
            button.set_text_content(Some("+"));
            button.set_onclick(Some(self.add_handler.as_ref().unchecked_ref()));
            self.roster.append_child(&button)?;
        }
        Ok(())
    }
}

impl RenderSink for DomSink {
    fn viewport(&self) -> Bounds {
        Bounds::new(self.area.offset_width() as f32, self.area.offset_height() as f32)
    }

    fn create_visual(&mut self, visual: Visual, owner: PlayerNumber, pos: Vec2) {
        let result = self.try_create(visual, owner, pos);
        log_err("create", result);
    }

    fn destroy_visual(&mut self, visual: Visual) {
        if let Some(el) = self.elements.remove(&visual) {
            el.remove();
        }
    }

    fn update_atom(&mut self, atom: &Atom) {
        if let Some(el) = self.elements.get(&Visual::Atom(atom.id)) {
            el.set_class_name(&owner_class("atom", atom.owner));
            el.unchecked_ref::<HtmlImageElement>()
                .set_src(&format!("img/{}-orbit.png", atom.protons));
            log_err("update", set_position(el, atom.pos));
        }
    }

    fn move_visual(&mut self, visual: Visual, pos: Vec2) {
        if let Some(el) = self.elements.get(&visual) {
            log_err("move", set_position(el, pos));
        }
    }

    fn replace_stage(&mut self, visuals: &[Visual]) {
        let result = self.try_replace_stage(visuals);
        log_err("stage", result);
    }

    fn render_players(&mut self, players: &[Player], can_add: bool) {
        let result = self.try_render_players(players, can_add);
        log_err("players", result);
    }

    fn bind_clicks(&mut self, clickable: &[AtomId]) {
        for (visual, el) in &self.elements {
            if let Visual::Atom(id) = visual {
                if clickable.contains(id) {
                    let handler = self
                        .click_handlers
                        .entry(*id)
                        .or_insert_with(|| dispatch_handler(&self.dispatcher, Action::Click(*id)));
                    el.set_onclick(Some(handler.as_ref().unchecked_ref()));
                } else {
                    el.set_onclick(None);
                }
            }
        }
    }
}
