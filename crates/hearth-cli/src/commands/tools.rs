use anyhow::Result;
use chrono::Local;
use hearth_core::error::translate;
use hearth_core::profile::{DateOfBirth, calculate_age_on, is_adult_on};

pub fn translate_text(text: &str) {
    let message = translate(text);
    println!("{:?}: {}", message.category, message.text);
}

pub fn age(year: &str, month: &str, day: &str) -> Result<()> {
    let today = Local::now().date_naive();
    let dob = DateOfBirth::parse(year, month, day, today)?;
    let age = calculate_age_on(&dob, today);
    let adult = if is_adult_on(&dob, today) { "adult" } else { "minor" };
    println!("{} ({})", age, adult);
    Ok(())
}
