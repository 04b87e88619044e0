pub const MODAL_ID: &str = "contactModal";
pub const BACKDROP_ID: &str = "modalBackdrop";
pub const FORM_ID: &str = "contactForm";
pub const STATUS_ID: &str = "formStatus";
pub const NAME_ID: &str = "nameInput";
pub const EMAIL_ID: &str = "emailInput";
pub const MESSAGE_ID: &str = "messageInput";
pub const CLOSE_SELECTOR: &str = ".modal-close";

pub const MODAL_MARKUP: &str = r#"
<div id="contactModal" class="modal" role="dialog" aria-modal="true" aria-labelledby="modalTitle" aria-hidden="true" tabindex="-1" style="display:none;">
  <div class="modal-content" role="document">
    <button class="modal-close" aria-label="Close contact form">&times;</button>
    <h2 id="modalTitle">Send us a Message</h2>
    <form id="contactForm" novalidate>
      <label for="nameInput">Name:</label>
      <input type="text" id="nameInput" name="name" required minlength="2" />

      <label for="emailInput">Email:</label>
      <input type="email" id="emailInput" name="email" required />

      <label for="messageInput">Message:</label>
      <textarea id="messageInput" name="message" required minlength="10"></textarea>

      <button type="submit" class="cta-btn">Send</button>
    </form>
    <div id="formStatus" aria-live="polite"></div>
  </div>
</div>
<div id="modalBackdrop" class="modal-backdrop" style="display:none;"></div>
"#;
