//! Locally generated replies used when the generation service is not consulted.

use crate::domain::persona::PersonaId;

/// Reply for sessions that are still observing.
pub const NEUTRAL_REPLY: &str = "Okay, can you tell me more about this?";

const ELDERLY_CONFUSED: &[&str] = &[
    "Oh dear, what happened? Why is my account blocked?",
    "I don't understand these things very well. Can you explain slowly?",
    "Which bank did you say you are calling from?",
    "My grandson usually helps me with this. Is it really safe?",
    "Wait, I am finding my reading glasses. Can you repeat the number?",
    "The phone is showing something strange. Can you send the details again?",
];

const BUSY_PROFESSIONAL: &[&str] = &[
    "I'm in a meeting. What exactly is the issue?",
    "Okay, what do I need to do to fix this quickly?",
    "Which UPI ID should I use? Send it in one message.",
    "How do I know this is legit? Send me something official.",
    "The payment app is timing out. Give me another account or UPI ID.",
    "Link isn't loading on my phone. Resend it?",
];

const CURIOUS_STUDENT: &[&str] = &[
    "Wait, really? How does this work?",
    "That sounds interesting! What do I have to do first?",
    "Is there a website or number where I can check this?",
    "My friend said these things can be fake. Can you prove it?",
    "Okay, where do I send the amount? Which account exactly?",
    "My UPI is not working right now. Is there another way to pay?",
];

const TECH_NAIVE_PARENT: &[&str] = &[
    "What happened? Is our family savings safe?",
    "Please tell me what I should do, I don't want any problem.",
    "Which office is this? Can I call you back on a number?",
    "My son told me not to share OTP. Why do you need it?",
    "Okay, tell me the account number again, I will write it down.",
    "The app is asking something else now. Can you send the link again?",
];

const DESPERATE_JOB_SEEKER: &[&str] = &[
    "Really? I have been looking for work for months. What is the position?",
    "What is the next step? I can start immediately.",
    "Which company is this? Is there an offer letter?",
    "Why do I need to pay a fee? Is it refundable?",
    "Okay, I can pay. Where should I send the registration fee?",
    "The payment failed. Can you share another UPI ID or account?",
];

/// Deterministic fallback reply for an engaged session.
///
/// Rotates through the persona's list by turn so consecutive fallbacks
/// differ. Sessions without a persona use the neutral reply.
pub fn fallback_reply(persona: Option<PersonaId>, message_count: u32) -> &'static str {
    let lines = match persona {
        Some(PersonaId::ElderlyConfused) => ELDERLY_CONFUSED,
        Some(PersonaId::BusyProfessional) => BUSY_PROFESSIONAL,
        Some(PersonaId::CuriousStudent) => CURIOUS_STUDENT,
        Some(PersonaId::TechNaiveParent) => TECH_NAIVE_PARENT,
        Some(PersonaId::DesperateJobSeeker) => DESPERATE_JOB_SEEKER,
        None => return NEUTRAL_REPLY,
    };
    lines[message_count as usize % lines.len()]
}
