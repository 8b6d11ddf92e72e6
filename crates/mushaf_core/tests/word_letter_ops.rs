use mushaf_core::db::open_db_in_memory;
use mushaf_core::{
    AttributeError, AyahId, AyahRepository, HarakatType, LetterRepository, NewAyah,
    NewLetterAnnotation, NewSurah, NewWord, RepoError, SqliteAyahRepository,
    SqliteLetterRepository, SqliteSurahRepository, SqliteWordRepository, SurahRepository, WordId,
    WordRepository,
};

fn seed_ayah(conn: &rusqlite::Connection) -> AyahId {
    let surahs = SqliteSurahRepository::try_new(conn).unwrap();
    let surah_id = surahs.create_surah(&NewSurah::new(1, "الفاتحة", 7)).unwrap();
    let ayahs = SqliteAyahRepository::try_new(conn).unwrap();
    ayahs
        .create_ayah(&NewAyah::new(surah_id, 1, "بِسۡمِ ٱللَّهِ", "بسم الله"))
        .unwrap()
}

fn seed_word(conn: &rusqlite::Connection) -> WordId {
    let ayah_id = seed_ayah(conn);
    let words = SqliteWordRepository::try_new(conn).unwrap();
    words
        .create_word(&NewWord::new(ayah_id, 1, "بِسۡمِ", "بسم"))
        .unwrap()
}

#[test]
fn word_create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let ayah_id = seed_ayah(&conn);
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let mut draft = NewWord::new(ayah_id, 1, "بِسۡمِ", "بسم");
    draft.transliteration = Some("bismi".to_string());
    draft.translation_en = Some("In the name".to_string());
    draft.root_letters = Some("سمو".to_string());
    let id = repo.create_word(&draft).unwrap();

    let loaded = repo.get_word(id).unwrap().unwrap();
    assert_eq!(loaded.ayah_id, ayah_id);
    assert_eq!(loaded.word_position, 1);
    assert_eq!(loaded.transliteration.as_deref(), Some("bismi"));
    assert_eq!(loaded.root_letters.as_deref(), Some("سمو"));
}

#[test]
fn word_create_under_missing_ayah_returns_parent_not_found() {
    let conn = open_db_in_memory().unwrap();
    let ayah_id = seed_ayah(&conn);
    let ayahs = SqliteAyahRepository::try_new(&conn).unwrap();
    ayahs.delete_ayah(ayah_id).unwrap();

    let repo = SqliteWordRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.create_word(&NewWord::new(ayah_id, 1, "كلمة", "كلمة"))
            .unwrap_err(),
        RepoError::ParentNotFound(_)
    ));
}

#[test]
fn duplicate_word_position_is_rejected_and_original_kept() {
    let conn = open_db_in_memory().unwrap();
    let ayah_id = seed_ayah(&conn);
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    repo.create_word(&NewWord::new(ayah_id, 1, "بِسۡمِ", "بسم"))
        .unwrap();
    let err = repo
        .create_word(&NewWord::new(ayah_id, 1, "ٱللَّهِ", "الله"))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateKey { entity: "words", .. }));

    let words = repo.list_by_ayah(ayah_id).unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].arabic_simple, "بسم");
}

#[test]
fn words_list_in_position_order() {
    let conn = open_db_in_memory().unwrap();
    let ayah_id = seed_ayah(&conn);
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    for (position, text) in [(3, "ٱلرَّحۡمَـٰنِ"), (1, "بِسۡمِ"), (2, "ٱللَّهِ")] {
        repo.create_word(&NewWord::new(ayah_id, position, text, text))
            .unwrap();
    }

    let first = repo.list_by_ayah(ayah_id).unwrap();
    let positions: Vec<u32> = first.iter().map(|word| word.word_position).collect();
    assert_eq!(positions, vec![1, 2, 3]);

    // Absent mutation, a repeated listing yields the same sequence.
    assert_eq!(repo.list_by_ayah(ayah_id).unwrap(), first);
}

#[test]
fn word_update_rejects_position_change() {
    let conn = open_db_in_memory().unwrap();
    let id = seed_word(&conn);
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let mut word = repo.get_word(id).unwrap().unwrap();
    word.word_position = 2;
    assert!(matches!(
        repo.update_word(&word).unwrap_err(),
        RepoError::InvalidAttribute(AttributeError::IdentityChanged {
            field: "word_position",
            ..
        })
    ));
}

#[test]
fn overlong_root_letters_are_rejected() {
    let conn = open_db_in_memory().unwrap();
    let ayah_id = seed_ayah(&conn);
    let repo = SqliteWordRepository::try_new(&conn).unwrap();

    let mut draft = NewWord::new(ayah_id, 1, "كلمة", "كلمة");
    draft.root_letters = Some("ابتثجحخدذر زسشصض".to_string());
    assert!(matches!(
        repo.create_word(&draft).unwrap_err(),
        RepoError::InvalidAttribute(AttributeError::TooLong {
            field: "root_letters",
            ..
        })
    ));
}

#[test]
fn annotation_create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let repo = SqliteLetterRepository::try_new(&conn).unwrap();

    let mut draft = NewLetterAnnotation::new(word_id, 1, "ب");
    draft.harakat_type = Some(HarakatType::Kasra);
    draft.harakat_symbol = Some("ِ".to_string());
    draft.has_qalqalah = true;
    let id = repo.create_annotation(&draft).unwrap();

    let loaded = repo.get_annotation(id).unwrap().unwrap();
    assert_eq!(loaded.letter_arabic, "ب");
    assert_eq!(loaded.harakat_type, Some(HarakatType::Kasra));
    assert!(loaded.has_qalqalah);
    assert!(!loaded.has_madd);
}

#[test]
fn annotation_requires_existing_word() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let words = SqliteWordRepository::try_new(&conn).unwrap();
    words.delete_word(word_id).unwrap();

    let repo = SqliteLetterRepository::try_new(&conn).unwrap();
    assert!(matches!(
        repo.create_annotation(&NewLetterAnnotation::new(word_id, 1, "ب"))
            .unwrap_err(),
        RepoError::ParentNotFound(_)
    ));
}

#[test]
fn duplicate_letter_position_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let repo = SqliteLetterRepository::try_new(&conn).unwrap();

    repo.create_annotation(&NewLetterAnnotation::new(word_id, 1, "ب"))
        .unwrap();
    assert!(matches!(
        repo.create_annotation(&NewLetterAnnotation::new(word_id, 1, "س"))
            .unwrap_err(),
        RepoError::DuplicateKey {
            entity: "letter_annotations",
            ..
        }
    ));
}

#[test]
fn multi_char_letter_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let repo = SqliteLetterRepository::try_new(&conn).unwrap();

    assert!(matches!(
        repo.create_annotation(&NewLetterAnnotation::new(word_id, 1, "بس"))
            .unwrap_err(),
        RepoError::InvalidAttribute(AttributeError::NotSingleLetter(_))
    ));
}

#[test]
fn annotations_list_in_letter_position_order() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let repo = SqliteLetterRepository::try_new(&conn).unwrap();

    for (position, letter) in [(2, "س"), (1, "ب"), (3, "م")] {
        repo.create_annotation(&NewLetterAnnotation::new(word_id, position, letter))
            .unwrap();
    }

    let first = repo.list_by_word(word_id).unwrap();
    let letters: Vec<&str> = first
        .iter()
        .map(|annotation| annotation.letter_arabic.as_str())
        .collect();
    assert_eq!(letters, vec!["ب", "س", "م"]);

    // Absent mutation, a repeated listing yields the same sequence.
    assert_eq!(repo.list_by_word(word_id).unwrap(), first);
}

#[test]
fn flag_toggles_update_independently() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let repo = SqliteLetterRepository::try_new(&conn).unwrap();

    let mut draft = NewLetterAnnotation::new(word_id, 1, "ق");
    draft.has_qalqalah = true;
    let id = repo.create_annotation(&draft).unwrap();

    let mut annotation = repo.get_annotation(id).unwrap().unwrap();
    annotation.has_madd = true;
    annotation.harakat_type = Some(HarakatType::Sukun);
    repo.update_annotation(&annotation).unwrap();

    let loaded = repo.get_annotation(id).unwrap().unwrap();
    assert!(loaded.has_madd);
    assert!(loaded.has_qalqalah);
    assert!(!loaded.has_ghunnah);
    assert_eq!(loaded.harakat_type, Some(HarakatType::Sukun));
}

#[test]
fn annotation_update_rejects_position_change() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let repo = SqliteLetterRepository::try_new(&conn).unwrap();

    let id = repo
        .create_annotation(&NewLetterAnnotation::new(word_id, 1, "ب"))
        .unwrap();
    let mut annotation = repo.get_annotation(id).unwrap().unwrap();
    annotation.letter_position = 2;

    assert!(matches!(
        repo.update_annotation(&annotation).unwrap_err(),
        RepoError::InvalidAttribute(AttributeError::IdentityChanged {
            field: "letter_position",
            ..
        })
    ));
}

#[test]
fn deleting_missing_annotation_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let word_id = seed_word(&conn);
    let repo = SqliteLetterRepository::try_new(&conn).unwrap();

    let id = repo
        .create_annotation(&NewLetterAnnotation::new(word_id, 1, "ب"))
        .unwrap();
    repo.delete_annotation(id).unwrap();
    assert!(matches!(
        repo.delete_annotation(id).unwrap_err(),
        RepoError::NotFound(_)
    ));
}
