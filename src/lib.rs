pub mod core;
pub mod mapper;
pub mod index;
pub mod writer;

/*
┌──────────────────────────────────────────────────────────────────────────────┐
│                         PLACE IMPORTER WRITE PATH                            │
└──────────────────────────────────────────────────────────────────────────────┘

  importer ──► Updater::update_or_create(&PlaceDoc) ──┐
           ──► Updater::delete(PlaceId) ──────────────┤
           ──► Updater::finish() ─────────────────────┤
                                                      ▼
  ┌────────────────────────────────────────────────────────────────────────┐
  │ struct BulkUpdater<C: IndexClient, M: FieldMapper>                     │
  │ • client: C            // exists(id) + bulk(ops)                       │
  │ • mapper: M            // PlaceDoc -> Payload (JSON object)            │
  │ • batch: Batch         // Vec<BulkOperation>, taken on every flush     │
  │ • stats: UpdaterStats                                                  │
  └────────────────────────────────────────────────────────────────────────┘
        │ upsert: exists? ── yes ─► BulkOperation::Update { id, payload }
        │                  └─ no ──► BulkOperation::Create { id, payload }
        │ delete:                 ► BulkOperation::Delete { id }
        ▼ flush: client.bulk(batch.take()) -> BulkResponse -> FlushReport

  ┌──────────────────────┐  ┌──────────────────────┐
  │ struct MemoryIndex   │  │ struct JsonDumpClient│
  │ • RwLock<HashMap>    │  │ • rolling .json files│
  └──────────────────────┘  └──────────────────────┘
*/
