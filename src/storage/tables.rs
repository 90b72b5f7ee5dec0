use redb::TableDefinition;

/// Book records: book id -> BookRecord (msgpack)
pub const BOOKS: TableDefinition<u64, &[u8]> = TableDefinition::new("books");

/// External identity index: book guid (u128) -> book id
pub const BOOK_GUIDS: TableDefinition<u128, u64> = TableDefinition::new("book_guids");

/// Ownership index: (user guid, book id) -> ()
pub const USER_BOOKS: TableDefinition<(u128, u64), ()> = TableDefinition::new("user_books");

/// Pick records: pick id -> PickRecord (msgpack)
pub const PICKS: TableDefinition<u64, &[u8]> = TableDefinition::new("picks");

/// External identity index: pick guid (u128) -> pick id
pub const PICK_GUIDS: TableDefinition<u128, u64> = TableDefinition::new("pick_guids");

/// Parent index: (book id, pick id) -> ()
pub const BOOK_PICKS: TableDefinition<(u64, u64), ()> = TableDefinition::new("book_picks");

/// Topic records: topic id -> TopicRecord (msgpack)
pub const TOPICS: TableDefinition<u64, &[u8]> = TableDefinition::new("topics");

/// Uniqueness index: (user guid, label) -> topic id
pub const TOPIC_LABELS: TableDefinition<(u128, &str), u64> = TableDefinition::new("topic_labels");

/// Association: (book id, topic id) -> ()
pub const BOOK_TOPICS: TableDefinition<(u64, u64), ()> = TableDefinition::new("book_topics");

/// Reverse association: (topic id, book id) -> ()
pub const TOPIC_BOOKS: TableDefinition<(u64, u64), ()> = TableDefinition::new("topic_books");

/// Keyword records: keyword id -> KeywordRecord (msgpack)
pub const PICK_KEYWORDS: TableDefinition<u64, &[u8]> = TableDefinition::new("pick_keywords");

/// Keyword index: (pick id, keyword id) -> ()
pub const KEYWORD_INDEX: TableDefinition<(u64, u64), ()> = TableDefinition::new("keyword_index");

/// Pending enrichment messages: outbox id -> EnrichmentMessage (msgpack)
pub const ENRICHMENT_OUTBOX: TableDefinition<u64, &[u8]> =
    TableDefinition::new("enrichment_outbox");

/// Id allocation: sequence name -> last allocated id
pub const SEQUENCES: TableDefinition<&str, u64> = TableDefinition::new("sequences");

pub const BOOK_SEQUENCE: &str = "books";
pub const PICK_SEQUENCE: &str = "picks";
pub const TOPIC_SEQUENCE: &str = "topics";
pub const KEYWORD_SEQUENCE: &str = "pick_keywords";
pub const OUTBOX_SEQUENCE: &str = "enrichment_outbox";
