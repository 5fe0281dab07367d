// Localized text tables.
use bevy::prelude::*;
use strum::{EnumCount, EnumIter};

use crate::progress::{PRIZE_ZONE, ZONE_COUNT};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, EnumIter, EnumCount)]
pub enum Language {
    #[default]
    En,
    Es,
}

impl Language {
    pub fn code(self) -> &'static str {
        match self {
            Language::En => "EN",
            Language::Es => "ES",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Language::En => Language::Es,
            Language::Es => Language::En,
        }
    }
}

#[derive(Resource, Debug, Default)]
pub struct Locale {
    pub language: Language,
}

impl Locale {
    pub fn texts(&self) -> &'static Texts {
        texts(self.language)
    }
}

pub struct Texts {
    pub title: &'static str,
    pub subtitle: &'static str,
    pub pin_prompt: &'static str,
    pub pin_error: &'static str,
    pub footer: &'static str,
    pub zones: [&'static str; PRIZE_ZONE + 1],
    pub welcome: &'static str,
    pub fail_button: &'static str,
    pub restart: &'static str,
    pub prize_title: &'static str,
    pub prize_message: &'static str,
    pub prize_signature: &'static str,
    pub prize_vouchers: [(&'static str, &'static str); 2],
    pub voucher: &'static str,
    pub screenshot: &'static str,
    pub completed: &'static str,
    pub complete_previous: &'static str,
    pub trigger_labels: [&'static str; ZONE_COUNT],
    pub trivia_question_of: &'static str,
    pub trivia_success: &'static str,
    pub trivia_fail: &'static str,
    pub driving_title: &'static str,
    pub driving_subtitle: &'static str,
    pub driving_success: &'static str,
    pub driving_fail: &'static str,
    pub memory_title: &'static str,
    pub memory_pairs: &'static str,
    pub memory_mismatches: &'static str,
    pub memory_success: &'static str,
    pub memory_fail: &'static str,
    pub sorting_prompt: &'static str,
    pub sorting_score: &'static str,
    pub sorting_need: &'static str,
    pub sorting_success: &'static str,
    pub sorting_result_fail: &'static str,
    pub sorting_fail: &'static str,
    pub sorting_angry: &'static str,
    pub sorting_sleeping: &'static str,
}

pub fn texts(language: Language) -> &'static Texts {
    match language {
        Language::En => &EN,
        Language::Es => &ES,
    }
}

/// Substitutes `{name}` placeholders in a template.
pub fn fill(template: &str, params: &[(&str, &dyn std::fmt::Display)]) -> String {
    let mut out = template.to_string();
    for (name, value) in params {
        out = out.replace(&format!("{{{name}}}"), &value.to_string());
    }
    out
}

static EN: Texts = Texts {
    title: "Alix's Valentine Adventure",
    subtitle: "An enchanted garden awaits",
    pin_prompt: "Enter our secret code",
    pin_error: "That's not it... try again",
    footer: "A gift from Luigi",
    zones: [
        "Start",
        "University Garden",
        "Parking Lot",
        "Cozy Apartment",
        "Movie Theater",
        "Prize Gazebo",
    ],
    welcome: "Follow the garden path... each gate opens with a little love.",
    fail_button: "Try Again",
    restart: "Restart",
    prize_title: "You Did It, Alix!",
    prize_message: "From a mattress on the floor to building our world together,\nevery moment with you is my favorite adventure.\n\nHappy Valentine's Day, mi amor.",
    prize_signature: "- Luigi",
    prize_vouchers: [
        ("Full Day SPA", "A complete day of relaxation, you deserve it"),
        ("Photography Session", "A professional photo session, capturing our moments"),
    ],
    voucher: "VOUCHER",
    screenshot: "Screenshot this!",
    completed: "Completed!",
    complete_previous: "Complete previous zone first",
    trigger_labels: [
        "Press E - Love Letter",
        "Press E - Get In!",
        "Press E - Play Memories",
        "Press E - Take a Seat",
    ],
    trivia_question_of: "Question {current} of {total}",
    trivia_success: "The heart gate opens!",
    trivia_fail: "That wasn't quite right... Try again with love!",
    driving_title: "Park Alix's Car!",
    driving_subtitle: "Drive into the green spot, don't hit anything!",
    driving_success: "Perfect parking! Luigi is impressed",
    driving_fail: "You Crashed! Not again Alix",
    memory_title: "Match Our Memories",
    memory_pairs: "Pairs",
    memory_mismatches: "Mismatches",
    memory_success: "This is where our story began",
    memory_fail: "Too many mismatches! Our memories are tricky...",
    sorting_prompt: "Is Alix...",
    sorting_score: "Score",
    sorting_need: "Need {n} to pass",
    sorting_success: "Luigi knows you too well",
    sorting_result_fail: "Not quite...",
    sorting_fail: "Alix is unpredictable... Try again!",
    sorting_angry: "Angry",
    sorting_sleeping: "Sleeping",
};

static ES: Texts = Texts {
    title: "La Aventura de San Valentín de Alix",
    subtitle: "Un jardín encantado te espera",
    pin_prompt: "Ingresa nuestro código secreto",
    pin_error: "Ese no es... intenta de nuevo",
    footer: "Un regalo de Luigi",
    zones: [
        "Inicio",
        "Jardín Universitario",
        "Estacionamiento",
        "Apartamento Acogedor",
        "Sala de Cine",
        "Glorieta del Premio",
    ],
    welcome: "Sigue el sendero del jardín... cada puerta se abre con un poco de amor.",
    fail_button: "Intentar de Nuevo",
    restart: "Reiniciar",
    prize_title: "¡Lo Lograste, Alix!",
    prize_message: "De un colchón en el piso a construir nuestro mundo juntos,\ncada momento contigo es mi aventura favorita.\n\nFeliz Día de San Valentín, mi amor.",
    prize_signature: "- Luigi",
    prize_vouchers: [
        ("Día Completo de SPA", "Un día completo de relajación, te lo mereces"),
        ("Sesión de Fotos", "Una sesión de fotos profesional, capturando nuestros momentos"),
    ],
    voucher: "VALE",
    screenshot: "¡Toma captura de pantalla!",
    completed: "¡Completado!",
    complete_previous: "Completa la zona anterior primero",
    trigger_labels: [
        "Pulsa E - Carta de Amor",
        "Pulsa E - ¡Sube!",
        "Pulsa E - Jugar Recuerdos",
        "Pulsa E - Toma Asiento",
    ],
    trivia_question_of: "Pregunta {current} de {total}",
    trivia_success: "¡La puerta del corazón se abre!",
    trivia_fail: "No fue del todo correcto... ¡Intenta de nuevo con amor!",
    driving_title: "¡Estaciona el Auto de Alix!",
    driving_subtitle: "¡Conduce al espacio verde, no choques con nada!",
    driving_success: "¡Estacionamiento perfecto! Luigi está impresionado",
    driving_fail: "¡Chocaste! Otra vez no, Alix",
    memory_title: "Empareja Nuestros Recuerdos",
    memory_pairs: "Pares",
    memory_mismatches: "Errores",
    memory_success: "Aquí es donde comenzó nuestra historia",
    memory_fail: "¡Demasiados errores! Nuestros recuerdos son difíciles...",
    sorting_prompt: "¿Alix está...",
    sorting_score: "Puntos",
    sorting_need: "Necesitas {n} para pasar",
    sorting_success: "Luigi te conoce demasiado bien",
    sorting_result_fail: "No del todo...",
    sorting_fail: "¡Alix es impredecible... Intenta de nuevo!",
    sorting_angry: "Enojada",
    sorting_sleeping: "Dormida",
};

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn fill_replaces_every_placeholder() {
        let text = fill(
            texts(Language::En).trivia_question_of,
            &[("current", &2), ("total", &3)],
        );
        assert_eq!(text, "Question 2 of 3");

        let text = fill(texts(Language::Es).sorting_need, &[("n", &8)]);
        assert_eq!(text, "Necesitas 8 para pasar");
    }

    #[test]
    fn every_language_has_a_name_per_zone() {
        assert_eq!(Language::iter().count(), Language::COUNT);
        for language in Language::iter() {
            let table = texts(language);
            assert!(table.zones.iter().all(|name| !name.is_empty()));
            assert!(table.trigger_labels.iter().all(|label| !label.is_empty()));
        }
    }

    #[test]
    fn language_toggle_cycles() {
        let start = Language::default();
        let mut language = start;
        for _ in 0..Language::COUNT {
            language = language.next();
        }
        assert_eq!(language, start);
    }
}
