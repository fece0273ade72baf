use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use shared::{domain::QuestionId, protocol::Question, protocol::SubmitAnswerResponse};

pub(crate) fn sample_png() -> Vec<u8> {
    let image = RgbaImage::from_pixel(4, 3, Rgba([74, 222, 128, 255]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(image)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .expect("encode png");
    bytes
}

pub(crate) fn question(id: i64, text: &str, options: &[&str], answer: Option<&str>) -> Question {
    Question {
        id: QuestionId::from(id),
        question: text.to_string(),
        options: options.iter().map(|option| option.to_string()).collect(),
        answer: answer.map(str::to_string),
    }
}

pub(crate) fn arithmetic_question() -> Question {
    question(1, "2+2?", &["3", "4"], Some("4"))
}

pub(crate) fn feedback(message: &str) -> SubmitAnswerResponse {
    SubmitAnswerResponse {
        message: message.to_string(),
        correct: None,
        correct_answer: None,
    }
}
