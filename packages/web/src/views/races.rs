//! Race dashboard. Each row action opens one of the built-in dialogs.

use dioxus::prelude::*;
use modals::{ButtonSpec, ButtonStyle, DetailContent, Markup, ModalId, ModalOptions};
use serde::Serialize;
use ui::{use_modals, PlatformModals, WeakPlatformModals};

const NAME_INPUT_ID: &str = "raceNameInput";
const TRACK_INPUT_ID: &str = "raceTrackInput";

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Race {
    id: u32,
    track: String,
    name: String,
    distance_m: u32,
    finished: bool,
    replay: Option<String>,
}

fn sample_races() -> Vec<Race> {
    vec![
        Race {
            id: 1,
            track: "서울".to_string(),
            name: "제1경주 국산 5등급".to_string(),
            distance_m: 1200,
            finished: true,
            replay: Some("https://race.kra.co.kr/replay/seoul/1".to_string()),
        },
        Race {
            id: 2,
            track: "부산경남".to_string(),
            name: "제2경주 혼합 4등급".to_string(),
            distance_m: 1400,
            finished: false,
            replay: None,
        },
        Race {
            id: 3,
            track: "제주".to_string(),
            name: "제3경주 제주 3등급".to_string(),
            distance_m: 1000,
            finished: false,
            replay: None,
        },
    ]
}

fn race_form(race: Option<&Race>) -> Markup {
    let name = race.map(|r| r.name.as_str()).unwrap_or_default();
    let track = race.map(|r| r.track.as_str()).unwrap_or_default();
    Markup::raw(format!(
        "<form>\
         <div class=\"mb-3\"><label class=\"form-label\" for=\"{NAME_INPUT_ID}\">경주명</label>\
         <input class=\"form-control\" id=\"{NAME_INPUT_ID}\" value=\"{}\"></div>\
         <div class=\"mb-3\"><label class=\"form-label\" for=\"{TRACK_INPUT_ID}\">경마장</label>\
         <input class=\"form-control\" id=\"{TRACK_INPUT_ID}\" value=\"{}\"></div>\
         </form>",
        Markup::text(name).as_str(),
        Markup::text(track).as_str(),
    ))
}

#[cfg(target_arch = "wasm32")]
fn input_value(id: &str) -> Option<String> {
    use wasm_bindgen::JsCast;

    web_sys::window()?
        .document()?
        .get_element_by_id(id)?
        .dyn_into::<web_sys::HtmlInputElement>()
        .ok()
        .map(|input| input.value())
}

#[cfg(not(target_arch = "wasm32"))]
fn input_value(_id: &str) -> Option<String> {
    None
}

async fn simulated_fetch() {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(800).await;
}

fn hide(manager: &WeakPlatformModals, id: &str) {
    if let Some(modals) = manager.upgrade() {
        if let Err(e) = modals.hide(id) {
            tracing::error!("Failed to hide {}: {}", id, e);
        }
    }
}

fn show_race(modals: &PlatformModals, race: &Race) {
    let result = DetailContent::from_serialize(race)
        .and_then(|content| modals.show_detail(&race.name, content, &ModalOptions::default()));
    if let Err(e) = result {
        tracing::error!("Failed to show race {}: {}", race.id, e);
    }
}

fn edit_race(modals: &PlatformModals, race: &Race, races: Signal<Vec<Race>>) {
    let manager = modals.downgrade();
    let id = race.id;
    let on_save = move || {
        let mut races = races;
        if let Some(race) = races.write().iter_mut().find(|r| r.id == id) {
            if let Some(name) = input_value(NAME_INPUT_ID) {
                race.name = name;
            }
            if let Some(track) = input_value(TRACK_INPUT_ID) {
                race.track = track;
            }
        }
        hide(&manager, ModalId::EDIT);
    };
    let title = format!("{} 수정", race.name);
    let form = race_form(Some(race));
    if let Err(e) = modals.show_edit(&title, form, on_save, &ModalOptions::default()) {
        tracing::error!("Failed to open edit form: {}", e);
    }
}

fn create_race(modals: &PlatformModals, races: Signal<Vec<Race>>) {
    let manager = modals.downgrade();
    let on_create = move || {
        let mut races = races;
        let next_id = races.read().iter().map(|r| r.id).max().unwrap_or(0) + 1;
        races.write().push(Race {
            id: next_id,
            track: input_value(TRACK_INPUT_ID).unwrap_or_default(),
            name: input_value(NAME_INPUT_ID).unwrap_or_else(|| format!("제{next_id}경주")),
            distance_m: 1200,
            finished: false,
            replay: None,
        });
        hide(&manager, ModalId::CREATE);
    };
    let form = race_form(None);
    if let Err(e) = modals.show_create("경주 추가", form, on_create, &ModalOptions::default()) {
        tracing::error!("Failed to open create form: {}", e);
    }
}

fn delete_race(modals: &PlatformModals, race: &Race, races: Signal<Vec<Race>>) {
    let manager = modals.downgrade();
    let id = race.id;
    let on_delete = move || {
        let mut races = races;
        races.write().retain(|r| r.id != id);
        hide(&manager, ModalId::DELETE);
    };
    let message = format!("'{}' 경주를 삭제하시겠습니까?", race.name);
    if let Err(e) = modals.show_delete(&message, on_delete, &ModalOptions::default()) {
        tracing::error!("Failed to open delete dialog: {}", e);
    }
}

/// Result entry. Finished races only get the default close button.
fn record_result(modals: &PlatformModals, race: &Race, races: Signal<Vec<Race>>) {
    let buttons = if race.finished {
        Vec::new()
    } else {
        let manager = modals.downgrade();
        let id = race.id;
        vec![
            ButtonSpec::dismiss(&modals.labels().close),
            ButtonSpec::action("완료 처리", move || {
                let mut races = races;
                if let Some(race) = races.write().iter_mut().find(|r| r.id == id) {
                    race.finished = true;
                }
                hide(&manager, ModalId::CUSTOM);
            })
            .style(ButtonStyle::Success)
            .name("finish"),
        ]
    };
    let body = if race.finished {
        Markup::text("이미 완료된 경주입니다.")
    } else {
        Markup::text(&format!("{} ({}m) 경주를 완료 처리합니다.", race.name, race.distance_m))
    };
    if let Err(e) = modals.show_custom("경주 결과", body, buttons, &ModalOptions::default()) {
        tracing::error!("Failed to open result dialog: {}", e);
    }
}

#[component]
pub fn Races() -> Element {
    let modals = use_modals();
    let races = use_signal(sample_races);
    let mut status = use_signal(|| Option::<String>::None);

    let refresh = {
        let modals = modals.clone();
        move |_: Event<MouseData>| {
            let modals = modals.clone();
            spawn(async move {
                let loaded = modals
                    .while_loading(Some("경주 정보를 불러오는 중..."), simulated_fetch())
                    .await;
                match loaded {
                    Ok(()) => status.set(Some("경주 정보를 새로 불러왔습니다.".to_string())),
                    Err(e) => tracing::error!("Failed to refresh races: {}", e),
                }
            });
        }
    };

    let reset = {
        let modals = modals.clone();
        move |_: Event<MouseData>| {
            let mut races = races;
            let answer = match modals.confirm("샘플 데이터로 되돌릴까요?", None) {
                Ok(answer) => answer,
                Err(e) => {
                    tracing::error!("Failed to open confirm dialog: {}", e);
                    return;
                }
            };
            spawn(async move {
                if answer.await {
                    races.set(sample_races());
                    status.set(Some("샘플 데이터로 되돌렸습니다.".to_string()));
                }
            });
        }
    };

    let create = {
        let modals = modals.clone();
        move |_: Event<MouseData>| create_race(&modals, races)
    };

    rsx! {
        div { class: "container py-4",
            div { class: "d-flex justify-content-between align-items-center mb-3",
                h1 { class: "h3 mb-0", "경주 목록" }
                div { class: "btn-group",
                    button { class: "btn btn-outline-secondary", onclick: refresh, "새로고침" }
                    button { class: "btn btn-outline-danger", onclick: reset, "초기화" }
                    button { class: "btn btn-success", onclick: create, "경주 추가" }
                }
            }
            if let Some(message) = status() {
                div { class: "alert alert-info", "{message}" }
            }
            table { class: "table table-hover align-middle",
                thead {
                    tr {
                        th { "#" }
                        th { "경마장" }
                        th { "경주명" }
                        th { "거리" }
                        th { "상태" }
                        th {}
                    }
                }
                tbody {
                    for race in races() {
                        RaceRow { key: "{race.id}", race, races }
                    }
                }
            }
        }
    }
}

#[component]
fn RaceRow(race: Race, races: Signal<Vec<Race>>) -> Element {
    let modals = use_modals();

    let show = {
        let (modals, race) = (modals.clone(), race.clone());
        move |_: Event<MouseData>| show_race(&modals, &race)
    };
    let edit = {
        let (modals, race) = (modals.clone(), race.clone());
        move |_: Event<MouseData>| edit_race(&modals, &race, races)
    };
    let result = {
        let (modals, race) = (modals.clone(), race.clone());
        move |_: Event<MouseData>| record_result(&modals, &race, races)
    };
    let delete = {
        let (modals, race) = (modals.clone(), race.clone());
        move |_: Event<MouseData>| delete_race(&modals, &race, races)
    };

    rsx! {
        tr {
            td { "{race.id}" }
            td { "{race.track}" }
            td { "{race.name}" }
            td { "{race.distance_m}m" }
            td {
                if race.finished {
                    span { class: "badge bg-success", "완료" }
                } else {
                    span { class: "badge bg-secondary", "예정" }
                }
            }
            td { class: "text-end",
                div { class: "btn-group btn-group-sm",
                    button { class: "btn btn-outline-primary", onclick: show, "상세" }
                    button { class: "btn btn-outline-secondary", onclick: edit, "수정" }
                    button { class: "btn btn-outline-success", onclick: result, "결과" }
                    button { class: "btn btn-outline-danger", onclick: delete, "삭제" }
                }
            }
        }
    }
}
