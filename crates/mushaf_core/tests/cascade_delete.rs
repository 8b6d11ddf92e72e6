use mushaf_core::db::open_db_in_memory;
use mushaf_core::{
    CorpusService, NewAyah, NewLetterAnnotation, NewSurah, NewWord, RepoError,
};
use rusqlite::Connection;

struct Subtree {
    surah_id: mushaf_core::SurahId,
    ayah_id: mushaf_core::AyahId,
    word_id: mushaf_core::WordId,
    annotation_id: mushaf_core::AnnotationId,
}

fn seed_subtree(service: &CorpusService<'_>, surah_number: u32) -> Subtree {
    let surah_id = service
        .create_surah(&NewSurah::new(surah_number, "السورة", 1))
        .unwrap();
    let ayah_id = service
        .create_ayah(&NewAyah::new(surah_id, 1, "نص", "نص"))
        .unwrap();
    let word_id = service
        .create_word(&NewWord::new(ayah_id, 1, "بِسۡمِ", "بسم"))
        .unwrap();
    let annotation_id = service
        .create_annotation(&NewLetterAnnotation::new(word_id, 1, "ب"))
        .unwrap();
    Subtree {
        surah_id,
        ayah_id,
        word_id,
        annotation_id,
    }
}

fn count_rows(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

#[test]
fn deleting_surah_removes_whole_subtree() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let subtree = seed_subtree(&service, 1);

    service.delete_surah(subtree.surah_id).unwrap();

    assert!(service.get_surah(subtree.surah_id).unwrap().is_none());
    assert!(service.get_ayah(subtree.ayah_id).unwrap().is_none());
    assert!(service.get_word(subtree.word_id).unwrap().is_none());
    assert!(service
        .get_annotation(subtree.annotation_id)
        .unwrap()
        .is_none());
    for table in ["surahs", "ayahs", "words", "letter_annotations"] {
        assert_eq!(count_rows(&conn, table), 0, "{table} not emptied");
    }
}

#[test]
fn deleting_surah_removes_its_translations() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let subtree = seed_subtree(&service, 1);

    let mut translations = std::collections::BTreeMap::new();
    translations.insert("en".to_string(), "text".to_string());
    service
        .set_ayah_translations(subtree.ayah_id, &translations)
        .unwrap();

    service.delete_surah(subtree.surah_id).unwrap();
    assert_eq!(count_rows(&conn, "ayah_translations"), 0);
}

#[test]
fn deleting_surah_leaves_sibling_subtrees_untouched() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let doomed = seed_subtree(&service, 1);
    let kept = seed_subtree(&service, 2);

    service.delete_surah(doomed.surah_id).unwrap();

    let surah = service.get_surah(kept.surah_id).unwrap().unwrap();
    assert_eq!(surah.surah_number, 2);
    assert_eq!(service.list_ayahs_by_surah(kept.surah_id).unwrap().len(), 1);
    assert_eq!(service.list_words_by_ayah(kept.ayah_id).unwrap().len(), 1);
    assert_eq!(
        service.list_annotations_by_word(kept.word_id).unwrap().len(),
        1
    );
}

#[test]
fn deleting_ayah_keeps_parent_surah() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let subtree = seed_subtree(&service, 1);

    service.delete_ayah(subtree.ayah_id).unwrap();

    assert!(service.get_surah(subtree.surah_id).unwrap().is_some());
    assert!(service.get_word(subtree.word_id).unwrap().is_none());
    assert!(service
        .list_ayahs_by_surah(subtree.surah_id)
        .unwrap()
        .is_empty());
}

#[test]
fn deleting_word_keeps_sibling_words() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let subtree = seed_subtree(&service, 1);
    let sibling = service
        .create_word(&NewWord::new(subtree.ayah_id, 2, "ٱللَّهِ", "الله"))
        .unwrap();
    service
        .create_annotation(&NewLetterAnnotation::new(sibling, 1, "ا"))
        .unwrap();

    service.delete_word(subtree.word_id).unwrap();

    assert!(service.get_annotation(subtree.annotation_id).unwrap().is_none());
    let words = service.list_words_by_ayah(subtree.ayah_id).unwrap();
    assert_eq!(words.len(), 1);
    assert_eq!(words[0].word_position, 2);
    assert_eq!(service.list_annotations_by_word(sibling).unwrap().len(), 1);
}

#[test]
fn listing_children_of_deleted_parent_returns_parent_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let subtree = seed_subtree(&service, 1);

    service.delete_surah(subtree.surah_id).unwrap();

    assert!(matches!(
        service.list_ayahs_by_surah(subtree.surah_id).unwrap_err(),
        RepoError::ParentNotFound(_)
    ));
    assert!(matches!(
        service.list_words_by_ayah(subtree.ayah_id).unwrap_err(),
        RepoError::ParentNotFound(_)
    ));
    assert!(matches!(
        service.list_annotations_by_word(subtree.word_id).unwrap_err(),
        RepoError::ParentNotFound(_)
    ));
}

#[test]
fn fault_inside_cascade_surfaces_as_cascade_aborted_and_rolls_back() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let subtree = seed_subtree(&service, 1);

    // Simulate a storage fault mid-cascade: the word deletions abort after
    // the letter annotations were already removed.
    conn.execute_batch(
        "CREATE TRIGGER words_delete_fault BEFORE DELETE ON words
         BEGIN
             SELECT RAISE(ABORT, 'simulated storage fault');
         END;",
    )
    .unwrap();

    let err = service.delete_surah(subtree.surah_id).unwrap_err();
    assert!(matches!(
        err,
        RepoError::CascadeAborted {
            target: mushaf_core::EntityRef::Surah(_),
            ..
        }
    ));

    // The whole subtree must survive untouched, annotations included.
    conn.execute_batch("DROP TRIGGER words_delete_fault;").unwrap();
    assert!(service.get_surah(subtree.surah_id).unwrap().is_some());
    assert!(service.get_ayah(subtree.ayah_id).unwrap().is_some());
    assert!(service.get_word(subtree.word_id).unwrap().is_some());
    assert!(service
        .get_annotation(subtree.annotation_id)
        .unwrap()
        .is_some());
    for table in ["surahs", "ayahs", "words", "letter_annotations"] {
        assert_eq!(count_rows(&conn, table), 1, "{table} lost rows");
    }

    // With the fault gone the same delete completes.
    service.delete_surah(subtree.surah_id).unwrap();
    assert_eq!(count_rows(&conn, "surahs"), 0);
}

#[test]
fn deleting_same_subtree_twice_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = CorpusService::try_new(&conn).unwrap();
    let subtree = seed_subtree(&service, 1);

    service.delete_surah(subtree.surah_id).unwrap();
    assert!(matches!(
        service.delete_surah(subtree.surah_id).unwrap_err(),
        RepoError::NotFound(_)
    ));
    assert!(matches!(
        service.delete_ayah(subtree.ayah_id).unwrap_err(),
        RepoError::NotFound(_)
    ));
    assert!(matches!(
        service.delete_word(subtree.word_id).unwrap_err(),
        RepoError::NotFound(_)
    ));
}
