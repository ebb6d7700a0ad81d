//! Python bodies of the standard step patterns.
//!
//! Bodies are stored without indentation; the renderer indents them under the
//! generated `def`. They rely on the helpers emitted by [`MODULE_HEADER`].

pub const MODULE_HEADER: &str = r#"import time
from getgauge.python import step, before_suite, after_suite, Messages
from selenium import webdriver
from selenium.webdriver.common.by import By
from selenium.webdriver.support.ui import WebDriverWait, Select
from selenium.webdriver.support import expected_conditions as EC
from selenium.webdriver.chrome.service import Service
from selenium.webdriver.chrome.options import Options
from webdriver_manager.chrome import ChromeDriverManager

BASE_URL = @BASE_URL@
WAIT_TIMEOUT = @WAIT_TIMEOUT@
HEADLESS = @HEADLESS@
driver = None


@before_suite
def before_suite_hook():
    global driver
    options = Options()
    options.add_argument("--start-maximized")
    options.add_argument("--no-sandbox")
    options.add_argument("--disable-dev-shm-usage")
    if HEADLESS:
        options.add_argument("--headless=new")
    service = Service(ChromeDriverManager().install())
    driver = webdriver.Chrome(service=service, options=options)
    driver.implicitly_wait(WAIT_TIMEOUT)
    driver.set_page_load_timeout(30)


@after_suite
def after_suite_hook():
    global driver
    if driver:
        driver.quit()
        driver = None


def _find_field(element_id):
    candidates = [
        (By.ID, element_id),
        (By.NAME, element_id),
        (By.CSS_SELECTOR, f"input[placeholder='{element_id}']"),
        (By.CSS_SELECTOR, f"[aria-label='{element_id}']"),
    ]
    for by, selector in candidates:
        try:
            return WebDriverWait(driver, 2).until(EC.presence_of_element_located((by, selector)))
        except Exception:
            continue
    raise AssertionError(f"Field not found: '{element_id}'")


def _dismiss_alert():
    try:
        driver.switch_to.alert.dismiss()
    except Exception:
        pass


def _page_text():
    body = WebDriverWait(driver, WAIT_TIMEOUT).until(
        EC.presence_of_element_located((By.TAG_NAME, "body"))
    )
    return body.text


def _select_option(element_id, option):
    dropdown = Select(_find_field(element_id))
    try:
        dropdown.select_by_visible_text(option)
    except Exception:
        try:
            dropdown.select_by_value(option)
        except Exception:
            dropdown.select_by_index(1)
    Messages.write_message(f"Selected '{option}' in '{element_id}'")
"#;

pub const NAVIGATE: &str = r#"url = path if path.startswith("http") else BASE_URL.rstrip("/") + "/" + path.lstrip("/")
try:
    driver.get(url)
except Exception:
    driver.execute_script("window.stop();")
WebDriverWait(driver, WAIT_TIMEOUT).until(
    lambda d: d.execute_script("return document.readyState") in ("interactive", "complete")
)
Messages.write_message(f"Navigated to {url}")"#;

pub const NAVIGATE_BACK: &str = r#"url = path if path.startswith("http") else BASE_URL.rstrip("/") + "/" + path.lstrip("/")
driver.back()
time.sleep(1)
if path.lstrip("/") not in driver.current_url:
    driver.get(url)
Messages.write_message(f"Back at {driver.current_url}")"#;

pub const ENTER: &str = r#"field = _find_field(element_id)
if field.tag_name == "select":
    _select_option(element_id, value)
    return
field.clear()
field.send_keys(value)
Messages.write_message(f"Entered '{value}' into '{element_id}'")"#;

pub const ENTER_DROPDOWN: &str = r#"_select_option(element_id, value)"#;

pub const CLEAR: &str = r#"field = _find_field(element_id)
field.clear()
Messages.write_message(f"Cleared '{element_id}'")"#;

pub const SELECT: &str = r#"_select_option(element_id, value)"#;

pub const CLICK: &str = r#"candidates = [
    (By.ID, element_id),
    (By.NAME, element_id),
    (By.CSS_SELECTOR, f"input[value='{element_id}']"),
    (By.LINK_TEXT, element_id),
    (By.XPATH, f"//*[normalize-space(text())='{element_id}']"),
]
target = None
for by, selector in candidates:
    try:
        target = WebDriverWait(driver, 2).until(EC.element_to_be_clickable((by, selector)))
        break
    except Exception:
        continue
if target is None:
    raise AssertionError(f"Clickable element not found: '{element_id}'")
driver.execute_script("arguments[0].scrollIntoView(true);", target)
target.click()
time.sleep(0.5)
_dismiss_alert()
Messages.write_message(f"Clicked '{element_id}'")"#;

pub const PAGE_CONTAINS: &str = r#"time.sleep(0.5)
found = text in _page_text() or text in driver.page_source
assert found, f"Expected text not found on page: '{text}'""#;

pub const RESULT_CONTAINS: &str = r#"time.sleep(1)
page = _page_text()
assert expected in page or expected in driver.page_source, (
    f"Expected result '{expected}' not shown"
)
Messages.write_message(f"Result shows '{expected}'")"#;

pub const NO_VALID_RESULT: &str = r#"time.sleep(1)
_dismiss_alert()
assert driver.title, f"Page crashed after invalid input '{value}'"
source = driver.page_source.lower()
rejected = any(marker in source for marker in ("error", "invalid", "please provide", "please enter"))
Messages.write_message(f"Invalid input '{value}' handled, rejection shown: {rejected}")"#;

pub const FIELD_VALUE: &str = r#"field = _find_field(element_id)
actual = field.get_attribute("value") or ""
assert actual.strip() == expected.strip(), (
    f"Field '{element_id}' holds '{actual}', expected '{expected}'"
)"#;

pub const PAGE_LOADED: &str = r#"WebDriverWait(driver, WAIT_TIMEOUT).until(
    lambda d: d.execute_script("return document.readyState") == "complete"
)
assert driver.title, "Page has no title""#;

pub const RESULT_DISPLAYED: &str = r#"time.sleep(1)
source = driver.page_source
assert "$" in source or "result" in source.lower(), "No result displayed""#;

pub const USER_LOGGED_IN: &str = r#"time.sleep(1)
url = driver.current_url.lower()
if "login" in url or "sign-in" in url or "signin" in url:
    Messages.write_message("Still on the sign-in page, credentials may be invalid")
else:
    Messages.write_message(f"Logged in, now at {driver.current_url}")"#;

pub const LOGIN_ATTEMPTED: &str = r#"time.sleep(1)
assert driver.title, "Page crashed after login attempt"
Messages.write_message(f"Login attempted, now at {driver.current_url}")"#;

pub const SEARCH_NO_CRASH: &str = r#"time.sleep(1)
assert driver.title, "Page crashed after search"
Messages.write_message(f"Search completed, now at {driver.current_url}")"#;

pub const FORM_VISIBLE: &str = r#"form = WebDriverWait(driver, WAIT_TIMEOUT).until(
    EC.presence_of_element_located((By.TAG_NAME, "form"))
)
assert form.is_displayed(), "Form is not visible""#;

pub const CONDITION: &str = r#"time.sleep(0.5)
assert driver.title, f"Page not usable while checking: {condition}"
Messages.write_message(f"Checked: {condition}")"#;
