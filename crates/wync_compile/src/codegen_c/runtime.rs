//! The embedded C prelude every emitted program is prefixed with (spec.md
//! §4.4/§6, "Runtime ABI"). Defines the heterogeneous tagged value used for
//! array/map elements, option/result payloads, and closure captures, plus
//! ARC-managed arrays and maps, string helpers, numeric/bit/time/random
//! helpers, thread-backed futures and `spawn`, and the exception globals
//! `try`/`catch`/`throw` lower to.
//!
//! HTTP operations (`http_get`, `http_post`, ...) are declared `extern`
//! only: a real implementation needs TLS and an event loop, which is
//! genuinely out of scope for a self-contained prelude.

pub(super) const C_RUNTIME: &str = r#"
#include <stdio.h>
#include <stdlib.h>
#include <stdint.h>
#include <stdbool.h>
#include <string.h>
#include <inttypes.h>
#include <stdarg.h>
#include <math.h>
#include <time.h>
#include <setjmp.h>
#include <pthread.h>

/* ========== Tagged value ========== */

typedef enum {
    WYN_INT,
    WYN_FLOAT,
    WYN_BOOL,
    WYN_STRING,
    WYN_ARRAY,
    WYN_MAP,
    WYN_STRUCT,
    WYN_NONE,
} WynTag;

struct WynArray;
struct WynMap;

typedef struct WynValue {
    WynTag tag;
    union {
        int64_t i;
        double f;
        bool b;
        char *s;
        struct WynArray *arr;
        struct WynMap *map;
        void *obj;
    } as;
} WynValue;

static WynValue wyn_int(int64_t v) { WynValue val; val.tag = WYN_INT; val.as.i = v; return val; }
static WynValue wyn_float(double v) { WynValue val; val.tag = WYN_FLOAT; val.as.f = v; return val; }
static WynValue wyn_bool(bool v) { WynValue val; val.tag = WYN_BOOL; val.as.b = v; return val; }
static WynValue wyn_string(char *v) { WynValue val; val.tag = WYN_STRING; val.as.s = v; return val; }
static WynValue wyn_none(void) { WynValue val; val.tag = WYN_NONE; val.as.i = 0; return val; }

/* ========== ARC-managed heterogeneous array ========== */

typedef struct WynArray {
    WynValue *data;
    size_t len;
    size_t cap;
    int rc;
} WynArray;

static WynArray *wyn_array_new(void) {
    WynArray *a = (WynArray *)malloc(sizeof(WynArray));
    a->data = NULL;
    a->len = 0;
    a->cap = 0;
    a->rc = 1;
    return a;
}

static WynArray *wyn_array_retain(WynArray *a) {
    if (a) a->rc++;
    return a;
}

static void wyn_array_release(WynArray *a) {
    if (!a) return;
    if (--a->rc <= 0) {
        free(a->data);
        free(a);
    }
}

static void wyn_array_push(WynArray *a, WynValue v) {
    if (a->len == a->cap) {
        a->cap = a->cap ? a->cap * 2 : 8;
        a->data = (WynValue *)realloc(a->data, a->cap * sizeof(WynValue));
    }
    a->data[a->len++] = v;
}

/* 1-based indexing (spec.md §4.4, "Arrays are 1-indexed"). */
static WynValue wyn_array_get(WynArray *a, int64_t idx) { return a->data[idx - 1]; }
static void wyn_array_set(WynArray *a, int64_t idx, WynValue v) { a->data[idx - 1] = v; }
static int64_t wyn_array_len(WynArray *a) { return (int64_t)a->len; }

/* ========== ARC-managed heterogeneous map ========== */

typedef struct WynMapEntry {
    WynValue key;
    WynValue value;
    bool occupied;
} WynMapEntry;

typedef struct WynMap {
    WynMapEntry *entries;
    size_t cap;
    size_t len;
    int rc;
} WynMap;

static bool wyn_value_eq(WynValue a, WynValue b) {
    if (a.tag != b.tag) return false;
    switch (a.tag) {
        case WYN_INT: return a.as.i == b.as.i;
        case WYN_FLOAT: return a.as.f == b.as.f;
        case WYN_BOOL: return a.as.b == b.as.b;
        case WYN_STRING: return strcmp(a.as.s, b.as.s) == 0;
        case WYN_NONE: return true;
        default: return a.as.obj == b.as.obj;
    }
}

static size_t wyn_value_hash(WynValue v) {
    uint64_t h;
    switch (v.tag) {
        case WYN_INT: h = (uint64_t)v.as.i; break;
        case WYN_FLOAT: { uint64_t bits; memcpy(&bits, &v.as.f, sizeof(bits)); h = bits; break; }
        case WYN_BOOL: h = v.as.b ? 1 : 0; break;
        case WYN_STRING: {
            h = 1469598103934665603ULL;
            for (const char *p = v.as.s; *p; p++) { h ^= (uint8_t)*p; h *= 1099511628211ULL; }
            break;
        }
        default: h = (uint64_t)(uintptr_t)v.as.obj; break;
    }
    h = (h ^ (h >> 30)) * 0xbf58476d1ce4e5b9ULL;
    h = (h ^ (h >> 27)) * 0x94d049bb133111ebULL;
    return (size_t)(h ^ (h >> 31));
}

static WynMap *wyn_map_new(void) {
    WynMap *m = (WynMap *)malloc(sizeof(WynMap));
    m->cap = 16;
    m->entries = (WynMapEntry *)calloc(m->cap, sizeof(WynMapEntry));
    m->len = 0;
    m->rc = 1;
    return m;
}

static WynMap *wyn_map_retain(WynMap *m) {
    if (m) m->rc++;
    return m;
}

static void wyn_map_release(WynMap *m) {
    if (!m) return;
    if (--m->rc <= 0) {
        free(m->entries);
        free(m);
    }
}

static void wyn_map_resize(WynMap *m);

static void wyn_map_set(WynMap *m, WynValue key, WynValue value) {
    if (m->len * 2 >= m->cap) wyn_map_resize(m);
    size_t idx = wyn_value_hash(key) % m->cap;
    while (m->entries[idx].occupied) {
        if (wyn_value_eq(m->entries[idx].key, key)) {
            m->entries[idx].value = value;
            return;
        }
        idx = (idx + 1) % m->cap;
    }
    m->entries[idx].key = key;
    m->entries[idx].value = value;
    m->entries[idx].occupied = true;
    m->len++;
}

static void wyn_map_resize(WynMap *m) {
    size_t old_cap = m->cap;
    WynMapEntry *old = m->entries;
    m->cap *= 2;
    m->entries = (WynMapEntry *)calloc(m->cap, sizeof(WynMapEntry));
    m->len = 0;
    for (size_t i = 0; i < old_cap; i++) {
        if (old[i].occupied) wyn_map_set(m, old[i].key, old[i].value);
    }
    free(old);
}

static WynValue wyn_map_get(WynMap *m, WynValue key) {
    size_t idx = wyn_value_hash(key) % m->cap;
    size_t start = idx;
    while (m->entries[idx].occupied) {
        if (wyn_value_eq(m->entries[idx].key, key)) return m->entries[idx].value;
        idx = (idx + 1) % m->cap;
        if (idx == start) break;
    }
    return wyn_none();
}

static bool wyn_map_has(WynMap *m, WynValue key) {
    size_t idx = wyn_value_hash(key) % m->cap;
    size_t start = idx;
    while (m->entries[idx].occupied) {
        if (wyn_value_eq(m->entries[idx].key, key)) return true;
        idx = (idx + 1) % m->cap;
        if (idx == start) break;
    }
    return false;
}

static int64_t wyn_map_len(WynMap *m) { return (int64_t)m->len; }

/* ========== Option / Result ========== */

typedef struct { bool has_value; WynValue value; } WynOption;
typedef struct { bool is_ok; WynValue value; } WynResult;

static WynOption wyn_some(WynValue v) { WynOption o; o.has_value = true; o.value = v; return o; }
static WynOption wyn_option_none(void) { WynOption o; o.has_value = false; o.value = wyn_none(); return o; }
static WynResult wyn_ok(WynValue v) { WynResult r; r.is_ok = true; r.value = v; return r; }
static WynResult wyn_err(WynValue v) { WynResult r; r.is_ok = false; r.value = v; return r; }

/* ========== Closures ========== */

typedef struct WynClosure WynClosure;
typedef WynValue (*WynClosureFn)(WynClosure *self, WynValue *args, int argc);

struct WynClosure {
    WynClosureFn fn;
    WynValue *env;
    int env_len;
    int rc;
};

static WynClosure *wyn_closure_new(WynClosureFn fn, WynValue *env, int env_len) {
    WynClosure *c = (WynClosure *)malloc(sizeof(WynClosure));
    c->fn = fn;
    c->env = env;
    c->env_len = env_len;
    c->rc = 1;
    return c;
}

static WynValue wyn_closure_call(WynClosure *c, WynValue *args, int argc) {
    return c->fn(c, args, argc);
}

/* ========== Strings ========== */

static char *wyn_str_dup(const char *s) { return strdup(s ? s : ""); }

static char *wyn_str_concat(const char *a, const char *b) {
    size_t la = strlen(a), lb = strlen(b);
    char *out = (char *)malloc(la + lb + 1);
    memcpy(out, a, la);
    memcpy(out + la, b, lb);
    out[la + lb] = '\0';
    return out;
}

static char *wyn_sprintf(const char *fmt, ...) {
    va_list args, args2;
    va_start(args, fmt);
    va_copy(args2, args);
    int len = vsnprintf(NULL, 0, fmt, args);
    va_end(args);
    char *buf = (char *)malloc(len + 1);
    vsnprintf(buf, len + 1, fmt, args2);
    va_end(args2);
    return buf;
}

static char *wyn_int_to_str(int64_t v) { return wyn_sprintf("%" PRId64, v); }
static char *wyn_float_to_str(double v) { return wyn_sprintf("%g", v); }
static char *wyn_bool_to_str(bool v) { return wyn_str_dup(v ? "true" : "false"); }

static char *wyn_value_to_str(WynValue v) {
    switch (v.tag) {
        case WYN_INT: return wyn_int_to_str(v.as.i);
        case WYN_FLOAT: return wyn_float_to_str(v.as.f);
        case WYN_BOOL: return wyn_bool_to_str(v.as.b);
        case WYN_STRING: return wyn_str_dup(v.as.s);
        case WYN_NONE: return wyn_str_dup("none");
        default: return wyn_str_dup("<value>");
    }
}

static void wyn_print_value(WynValue v) {
    char *s = wyn_value_to_str(v);
    printf("%s\n", s);
    free(s);
}

static void wyn_print_str(const char *s) { printf("%s\n", s); }
static void wyn_print_i64(int64_t v) { printf("%" PRId64 "\n", v); }
static void wyn_print_f64(double v) { printf("%g\n", v); }
static void wyn_print_bool(bool v) { printf("%s\n", v ? "true" : "false"); }

/* ========== Numeric / bit helpers ========== */

static int64_t wyn_abs_i64(int64_t v) { return v < 0 ? -v : v; }
static double wyn_abs_f64(double v) { return fabs(v); }
static int64_t wyn_min_i64(int64_t a, int64_t b) { return a < b ? a : b; }
static int64_t wyn_max_i64(int64_t a, int64_t b) { return a > b ? a : b; }
static double wyn_pow_f64(double base, double exp) { return pow(base, exp); }
static int64_t wyn_floor_div(int64_t a, int64_t b) { return (int64_t)floor((double)a / (double)b); }

/* ========== Time / random ========== */

static int64_t wyn_time_now_millis(void) {
    struct timespec ts;
    clock_gettime(CLOCK_REALTIME, &ts);
    return (int64_t)ts.tv_sec * 1000 + ts.tv_nsec / 1000000;
}

static int64_t wyn_random_int(int64_t lo, int64_t hi) {
    if (hi <= lo) return lo;
    return lo + (int64_t)(rand() % (hi - lo));
}

static double wyn_random_float(void) { return (double)rand() / ((double)RAND_MAX + 1.0); }

/* ========== Exceptions ========== */

#define WYN_MAX_TRY_DEPTH 64

static jmp_buf wyn_try_stack[WYN_MAX_TRY_DEPTH];
static WynValue wyn_thrown_value;
static int wyn_try_depth = 0;

static void wyn_throw(WynValue v) {
    wyn_thrown_value = v;
    if (wyn_try_depth > 0) {
        longjmp(wyn_try_stack[wyn_try_depth - 1], 1);
    }
    char *s = wyn_value_to_str(v);
    fprintf(stderr, "uncaught exception: %s\n", s);
    free(s);
    exit(1);
}

/* ========== Assert / panic / exit ========== */

/* A failed assertion inside a `try` (or a `wyn test` block, which the
   driver's test runner wraps the same way) throws instead of aborting the
   process, so one failing test doesn't take the rest down with it. */
static void wyn_panic(const char *msg) {
    fprintf(stderr, "panic: %s\n", msg);
    if (wyn_try_depth > 0) {
        wyn_throw(wyn_string(wyn_str_dup((char *)msg)));
        return;
    }
    exit(1);
}

static void wyn_assert(bool cond, const char *msg) {
    if (!cond) wyn_panic(msg);
}

static void wyn_todo(const char *msg) {
    fprintf(stderr, "not yet implemented: %s\n", msg);
    exit(1);
}

/* ========== Futures and spawn (thread-backed) ========== */

typedef struct WynFuture {
    pthread_t thread;
    WynValue result;
    bool done;
} WynFuture;

typedef struct {
    WynValue (*body)(void *);
    void *arg;
    WynFuture *future;
} WynSpawnPacket;

static void *wyn_spawn_trampoline(void *raw) {
    WynSpawnPacket *pkt = (WynSpawnPacket *)raw;
    pkt->future->result = pkt->body(pkt->arg);
    pkt->future->done = true;
    free(pkt);
    return NULL;
}

static WynFuture *wyn_spawn(WynValue (*body)(void *), void *arg) {
    WynFuture *future = (WynFuture *)malloc(sizeof(WynFuture));
    future->done = false;
    WynSpawnPacket *pkt = (WynSpawnPacket *)malloc(sizeof(WynSpawnPacket));
    pkt->body = body;
    pkt->arg = arg;
    pkt->future = future;
    pthread_create(&future->thread, NULL, wyn_spawn_trampoline, pkt);
    return future;
}

static WynValue wyn_await(WynFuture *future) {
    pthread_join(future->thread, NULL);
    return future->result;
}

/* ========== argv/argc (spec.md §4.4, built-in functions) ========== */

static int _wyn_argc = 0;
static char **_wyn_argv = NULL;

static int64_t wyn_get_argc(void) { return (int64_t)_wyn_argc; }
static char *wyn_get_argv(int64_t idx) { return (idx >= 0 && idx < _wyn_argc) ? _wyn_argv[idx] : ""; }

static bool wyn_check_file_exists(const char *path) {
    FILE *f = fopen(path, "r");
    if (f) { fclose(f); return true; }
    return false;
}

static char *wyn_read_file_content(const char *path) {
    FILE *f = fopen(path, "rb");
    if (!f) return wyn_str_dup("");
    fseek(f, 0, SEEK_END);
    long len = ftell(f);
    fseek(f, 0, SEEK_SET);
    char *buf = (char *)malloc(len + 1);
    size_t read = fread(buf, 1, len, f);
    buf[read] = '\0';
    fclose(f);
    return buf;
}

/* ========== HTTP (out of scope; linked externally if used) ========== */

extern char *http_get(const char *url);
extern char *http_post(const char *url, const char *body);
extern char *http_put(const char *url, const char *body);
extern char *http_delete(const char *url);
extern char *https_get(const char *url);
extern char *https_post(const char *url, const char *body);
"#;
