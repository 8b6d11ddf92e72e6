//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mushaf_core` linkage.
//! - Load a tiny in-memory fixture through the public service surface and
//!   keep output deterministic for quick local sanity checks.

use mushaf_core::{
    AyahSeed, CorpusBatch, CorpusService, NewSurah, RepoError, SurahSeed, WordSeed,
};

fn main() {
    println!("mushaf_core ping={}", mushaf_core::ping());
    println!("mushaf_core version={}", mushaf_core::core_version());

    if let Err(err) = run_probe() {
        eprintln!("probe failed: {err}");
        std::process::exit(1);
    }
}

fn run_probe() -> Result<(), RepoError> {
    let conn = mushaf_core::open_db_in_memory()?;
    let service = CorpusService::try_new(&conn)?;

    let summary = service.load_batch(&fatihah_opening())?;
    println!(
        "loaded surahs={} ayahs={} words={} translations={}",
        summary.surahs, summary.ayahs, summary.words, summary.translations
    );

    let surah = service
        .find_surah_by_number(1)?
        .ok_or(RepoError::InvalidData("surah 1 missing after load".into()))?;
    let issues = service.audit_surah(surah.id)?;
    println!("audit issues={}", issues.len());
    for issue in &issues {
        println!("  {issue}");
    }
    Ok(())
}

/// Surah 1 with its opening verse, declared at full length.
fn fatihah_opening() -> CorpusBatch {
    let mut surah = SurahSeed::new(NewSurah::new(1, "الفاتحة", 7));
    let mut ayah = AyahSeed::new(
        1,
        "بِسۡمِ ٱللَّهِ ٱلرَّحۡمَـٰنِ ٱلرَّحِيمِ",
        "بسم الله الرحمن الرحيم",
    );
    ayah.juz_number = Some(1);
    ayah.page_number = Some(1);
    ayah.translations.insert(
        "en".to_string(),
        "In the name of Allah, the Most Gracious, the Most Merciful".to_string(),
    );

    let words = [
        ("بِسۡمِ", "بسم", "bismi", "In the name", "سمو"),
        ("ٱللَّهِ", "الله", "Allāhi", "Allah", "اله"),
        ("ٱلرَّحۡمَـٰنِ", "الرحمن", "ar-Raḥmāni", "The Most Gracious", "رحم"),
        ("ٱلرَّحِيمِ", "الرحيم", "ar-Raḥīmi", "The Most Merciful", "رحم"),
    ];
    for (position, (with_harakat, simple, translit, translation, root)) in
        words.into_iter().enumerate()
    {
        let mut word = WordSeed::new(position as u32 + 1, with_harakat, simple);
        word.transliteration = Some(translit.to_string());
        word.translation_en = Some(translation.to_string());
        word.root_letters = Some(root.to_string());
        ayah.words.push(word);
    }

    surah.ayahs.push(ayah);
    CorpusBatch {
        surahs: vec![surah],
    }
}
